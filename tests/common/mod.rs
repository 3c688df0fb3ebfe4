#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use sleep_quality::config::PredictionMode;
use sleep_quality::models::schema;
use sleep_quality::Config;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Nights present in both datasets
pub const SHARED_DAYS: usize = 40;
/// Index of the night with zero recorded sleep
pub const ZERO_SLEEP_DAY: usize = 5;
/// Index of the night without an Awake reading
pub const MISSING_AWAKE_DAY: usize = 7;

pub const EMPTY_COLUMN: &str = "Empty Column";
pub const DISCARDED_COLUMN: &str = "Minutos Conscientes (min)";

pub fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn day(index: usize) -> NaiveDate {
    first_day() + Duration::days(index as i64)
}

/// Health export: BOM, timestamped dates, one date missing from the weather
/// data, one all-empty column
pub fn health_csv() -> String {
    let header = [
        schema::HEALTH_DATE,
        schema::SLEEP_TOTAL,
        schema::SLEEP_CORE,
        schema::SLEEP_DEEP,
        schema::SLEEP_REM,
        schema::SLEEP_AWAKE,
        schema::HRV,
        schema::EXERCISE_MINUTES,
        schema::HEART_RATE_MEAN,
        DISCARDED_COLUMN,
        EMPTY_COLUMN,
    ];

    let mut out = format!("\u{feff}{}\n", header.join(","));
    for i in 0..=SHARED_DAYS {
        let (total, core, deep, rem, awake) = if i == ZERO_SLEEP_DAY {
            (0.0, 0.0, 0.0, 0.0, 0.0)
        } else {
            let total = 5.5 + (i % 6) as f64 * 0.5;
            let deep = total * 0.12 + (i % 4) as f64 * 0.05;
            let rem = total * 0.2 + (i % 3) as f64 * 0.1;
            let awake = 0.3;
            (total, total - deep - rem - awake, deep, rem, awake)
        };
        let awake = if i == MISSING_AWAKE_DAY {
            String::new()
        } else {
            awake.to_string()
        };
        // the last health night has no weather reading
        let date = if i == SHARED_DAYS { day(100) } else { day(i) };

        out.push_str(&format!(
            "{} 00:00:00,{},{},{},{},{},{},{},{},{},\n",
            date,
            total,
            core,
            deep,
            rem,
            awake,
            30 + (i * 7) % 40,
            (i * 13) % 60,
            60 + i % 10,
            i % 9,
        ));
    }
    out
}

/// Weather readings: one date missing from the health data
pub fn weather_csv() -> String {
    let header = [
        schema::DATE,
        schema::TEMPERATURE,
        schema::HUMIDITY,
        schema::PRECIPITATION,
    ];

    let mut out = format!("{}\n", header.join(","));
    for i in 0..SHARED_DAYS {
        out.push_str(&format!(
            "{},{},{},{}\n",
            day(i),
            10 + (i * 3) % 15,
            40 + (i * 11) % 50,
            (i % 5) as f64 * 0.4,
        ));
    }
    out.push_str(&format!("{},12,50,0\n", day(200)));
    out
}

pub struct Fixture {
    pub dir: TempDir,
    pub health: PathBuf,
    pub weather: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_contents(&health_csv(), &weather_csv())
    }

    pub fn with_contents(health: &str, weather: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let health_path = dir.path().join("HealthDataSet.csv");
        let weather_path = dir.path().join("datos_diarios_limpios.csv");
        fs::write(&health_path, health).unwrap();
        fs::write(&weather_path, weather).unwrap();

        Self {
            dir,
            health: health_path,
            weather: weather_path,
        }
    }

    pub fn config(&self, mode: PredictionMode) -> Config {
        let mut config = Config::default();
        config.data.health_path = self.health.clone();
        config.data.weather_path = self.weather.clone();
        config.model.prediction_mode = mode;
        config.importance.n_trees = 10;
        config
    }
}
