//! Column names of the two source datasets and of the derived label columns.
//!
//! The names are matched exactly, including the trailing space of the HRV
//! column in the health export.

/// Date column of the health export, renamed to [`DATE`] before joining
pub const HEALTH_DATE: &str = "Date";

/// Join key shared by both datasets after loading
pub const DATE: &str = "fecha";

pub const SLEEP_TOTAL: &str = "Análisis del Sueño [Total] (hr)";
pub const SLEEP_CORE: &str = "Análisis del Sueño [Core] (hr)";
pub const SLEEP_DEEP: &str = "Análisis del Sueño [Deep] (hr)";
pub const SLEEP_REM: &str = "Análisis del Sueño [REM] (hr)";
pub const SLEEP_AWAKE: &str = "Análisis del Sueño [Awake] (hr)";

pub const HRV: &str = "Variabilidad de Frecuencia Cardíaca (ms) ";
pub const EXERCISE_MINUTES: &str = "Minutos de Ejercicio (min)";
pub const HEART_RATE_MEAN: &str = "Frecuencia Cardíaca (count/min)";
pub const HEART_RATE_MIN: &str = "Frecuencia Cardíaca Mínima (count/min)";
pub const HEART_RATE_MAX: &str = "Frecuencia Cardíaca Máxima (count/min)";

pub const TEMPERATURE: &str = "Temperature";
pub const HUMIDITY: &str = "Humidity (%)";
pub const PRESSURE: &str = "Mean Sea Level Pressure (hPa)";
pub const PRECIPITATION: &str = "Precipitation Total";
pub const WIND: &str = "Wind Gust";

pub const SCORE_DURATION: &str = "score_duracion";
pub const DEEP_RATIO: &str = "deep_ratio";
pub const REM_RATIO: &str = "rem_ratio";
pub const SCORE_DEEP: &str = "score_deep";
pub const SCORE_REM: &str = "score_rem";
pub const SCORE_QUALITY: &str = "score_calidad";
pub const HRV_NORM: &str = "hrv_norm";
pub const SCORE_RECOVERY: &str = "score_recuperacion";
pub const TARGET: &str = "target";

/// Sleep-stage measurements, only known after the night they describe
pub const SLEEP_STAGE_COLUMNS: [&str; 5] =
    [SLEEP_TOTAL, SLEEP_CORE, SLEEP_DEEP, SLEEP_REM, SLEEP_AWAKE];

/// Columns a training-ready row must have populated
pub const REQUIRED_COLUMNS: [&str; 6] = [
    SLEEP_TOTAL,
    SLEEP_CORE,
    SLEEP_DEEP,
    SLEEP_REM,
    SLEEP_AWAKE,
    TARGET,
];

/// Intermediate label columns, removed from the training-ready variant
pub const HELPER_COLUMNS: [&str; 8] = [
    DEEP_RATIO,
    REM_RATIO,
    HRV_NORM,
    SCORE_DURATION,
    SCORE_DEEP,
    SCORE_REM,
    SCORE_QUALITY,
    SCORE_RECOVERY,
];

/// Source columns that never reach the training-ready variant
pub const DISCARDED_SOURCE_COLUMNS: [&str; 6] = [
    "Análisis del Sueño [Asleep] (hr)",
    "Análisis del Sueño [In Bed] (hr)",
    "Minutos Conscientes (min)",
    "Growing Degree Days",
    "Promedio de Frecuencia Cardíaca al Caminar (count/min)",
    "Tiempo en Luz de Día (min)",
];

/// Cell spellings read as missing values
pub const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
