use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::config::DataConfig;
use crate::error::{PipelineError, Result};
use crate::models::schema;
use crate::models::{Column, DailyRecords};
use crate::services::LabelSynthesisService;

const HEALTH_DATASET: &str = "health dataset";
const WEATHER_DATASET: &str = "weather dataset";

/// Raw bytes of both sources, read once so that fingerprinting and parsing
/// see the same content
#[derive(Debug, Clone)]
pub struct SourceBytes {
    pub health: Vec<u8>,
    pub weather: Vec<u8>,
}

impl SourceBytes {
    /// md5 over both files, separated so that moving bytes between them changes the digest
    pub fn fingerprint(&self) -> String {
        let mut context = md5::Context::new();
        context.consume((self.health.len() as u64).to_le_bytes());
        context.consume(&self.health);
        context.consume((self.weather.len() as u64).to_le_bytes());
        context.consume(&self.weather);
        format!("{:x}", context.compute())
    }
}

/// One parsed source: a date per row plus its numeric columns
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl SourceTable {
    /// Read a CSV table, normalizing `date_column` to calendar dates.
    ///
    /// A leading UTF-8 byte-order mark is ignored. Columns with any cell that
    /// is neither numeric nor a null marker are dropped; rows without a date
    /// are dropped. An unparseable date is fatal. Short rows read as null in
    /// their missing cells and fields past the header are ignored.
    pub fn read<R: Read>(reader: R, dataset: &str, date_column: &str) -> Result<Self> {
        let csv_error = |source| PipelineError::Csv {
            dataset: dataset.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == 0 {
                    h.trim_start_matches('\u{feff}').to_string()
                } else {
                    h.to_string()
                }
            })
            .collect();

        let date_index = headers
            .iter()
            .position(|h| h == date_column)
            .ok_or_else(|| PipelineError::missing_column(dataset, date_column))?;

        let mut dates = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        let mut non_numeric = vec![false; headers.len()];
        let mut undated_rows = 0usize;

        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let raw_date = record.get(date_index).unwrap_or("");

            if is_null(raw_date) {
                undated_rows += 1;
                continue;
            }

            let date = parse_calendar_date(raw_date).ok_or_else(|| PipelineError::DateParse {
                dataset: dataset.to_string(),
                row: row + 1,
                value: raw_date.to_string(),
            })?;
            dates.push(date);

            for (col, column_values) in values.iter_mut().enumerate() {
                if col == date_index {
                    continue;
                }
                let cell = record.get(col).unwrap_or("");
                let value = if is_null(cell) {
                    f64::NAN
                } else {
                    match cell.trim().parse::<f64>() {
                        Ok(v) => v,
                        Err(_) => {
                            non_numeric[col] = true;
                            f64::NAN
                        }
                    }
                };
                column_values.push(value);
            }
        }

        if undated_rows > 0 {
            warn!("Skipped {} rows without a date in {}", undated_rows, dataset);
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .enumerate()
            .filter_map(|(col, (name, values))| {
                if col == date_index {
                    None
                } else if non_numeric[col] {
                    warn!("Dropping non-numeric column '{}' from {}", name, dataset);
                    None
                } else {
                    Some(Column::new(name, values))
                }
            })
            .collect();

        Ok(Self { dates, columns })
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Remove every column whose cells are all missing
    pub fn drop_all_null_columns(&mut self) {
        let before = self.columns.len();
        self.columns.retain(|c| !c.is_all_null());
        let dropped = before - self.columns.len();
        if dropped > 0 {
            debug!("Dropped {} all-null columns", dropped);
        }
    }
}

fn is_null(cell: &str) -> bool {
    schema::NULL_MARKERS.contains(&cell.trim())
}

/// Parse a date or timestamp and keep only its calendar date.
///
/// Offset-qualified timestamps keep the date local to their offset.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    const OFFSET_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%Y-%m-%d %H:%M %z",
        "%Y-%m-%d %H:%M:%S%z",
    ];
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.date_naive());
        }
    }

    const DATETIME_FORMATS: [&str; 8] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Inner join on calendar date, in health-row order.
///
/// Each date appears at most once in the output: a repeated date in either
/// source keeps its first row. Non-key columns present in both sources are
/// suffixed `_x` (health) and `_y` (weather).
pub fn inner_join(health: SourceTable, weather: SourceTable) -> Result<DailyRecords> {
    let mut weather_rows: HashMap<NaiveDate, usize> = HashMap::with_capacity(weather.dates.len());
    let mut weather_duplicates = 0usize;
    for (row, date) in weather.dates.iter().enumerate() {
        match weather_rows.entry(*date) {
            Entry::Occupied(_) => weather_duplicates += 1,
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }
    if weather_duplicates > 0 {
        warn!("{} repeated dates in {}, keeping the first row of each", weather_duplicates, WEATHER_DATASET);
    }

    let mut seen = HashSet::with_capacity(health.dates.len());
    let mut health_duplicates = 0usize;
    let mut pairs = Vec::new();
    for (row, date) in health.dates.iter().enumerate() {
        if !seen.insert(*date) {
            health_duplicates += 1;
            continue;
        }
        if let Some(&weather_row) = weather_rows.get(date) {
            pairs.push((row, weather_row));
        }
    }
    if health_duplicates > 0 {
        warn!("{} repeated dates in {}, keeping the first row of each", health_duplicates, HEALTH_DATASET);
    }

    let health_names: HashSet<&str> = health.column_names().into_iter().collect();
    let weather_names: HashSet<&str> = weather.column_names().into_iter().collect();

    let dates = pairs.iter().map(|&(h, _)| health.dates[h]).collect();
    let mut columns = Vec::with_capacity(health.columns.len() + weather.columns.len());

    for column in &health.columns {
        let name = if weather_names.contains(column.name.as_str()) {
            format!("{}_x", column.name)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, pairs.iter().map(|&(h, _)| column.values[h]).collect()));
    }
    for column in &weather.columns {
        let name = if health_names.contains(column.name.as_str()) {
            format!("{}_y", column.name)
        } else {
            column.name.clone()
        };
        columns.push(Column::new(name, pairs.iter().map(|&(_, w)| column.values[w]).collect()));
    }

    DailyRecords::new(dates, columns)
}

/// Reads both datasets and produces labelled daily records
#[derive(Debug, Clone)]
pub struct DataLoaderService {
    config: DataConfig,
    labels: LabelSynthesisService,
}

impl DataLoaderService {
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            labels: LabelSynthesisService::new(),
        }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Read both source files into memory
    pub fn read_sources(&self) -> Result<SourceBytes> {
        Ok(SourceBytes {
            health: read_file(&self.config.health_path)?,
            weather: read_file(&self.config.weather_path)?,
        })
    }

    /// Load, join and label the datasets.
    ///
    /// With `all_rows` the labelled join is returned untouched, helper columns
    /// and incomplete rows included. Otherwise the training-ready variant is
    /// returned.
    #[instrument(skip(self))]
    pub fn load(&self, all_rows: bool) -> Result<DailyRecords> {
        let sources = self.read_sources()?;
        self.load_from(&sources, all_rows)
    }

    /// Same as [`DataLoaderService::load`] over already-read bytes
    pub fn load_from(&self, sources: &SourceBytes, all_rows: bool) -> Result<DailyRecords> {
        let mut records = self.join(sources)?;
        self.labels.synthesize(&mut records)?;

        if !all_rows {
            self.labels.prepare_training_set(&mut records)?;
        }

        info!(
            "Loaded {} daily records ({} columns, all_rows={})",
            records.len(),
            records.columns().len(),
            all_rows
        );
        Ok(records)
    }

    /// Parse both sources and inner-join them, without labels
    pub fn join(&self, sources: &SourceBytes) -> Result<DailyRecords> {
        let mut health =
            SourceTable::read(sources.health.as_slice(), HEALTH_DATASET, schema::HEALTH_DATE)?;
        let weather = SourceTable::read(sources.weather.as_slice(), WEATHER_DATASET, schema::DATE)?;

        health.drop_all_null_columns();

        debug!(
            "Joining {} health rows with {} weather rows",
            health.dates.len(),
            weather.dates.len()
        );
        inner_join(health, weather)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_calendar_date_formats() {
        assert_eq!(parse_calendar_date("2024-05-01"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("2024-05-01 23:59:00"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("2024-05-01T07:30:00"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("2024-05-01 00:00:00 +0200"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("2024-05-01T22:00:00Z"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("05/01/2024"), Some(date(2024, 5, 1)));
        assert_eq!(parse_calendar_date("yesterday"), None);
    }

    #[test]
    fn test_read_strips_bom_and_drops_text_columns() {
        let csv = "\u{feff}Date,steps,note\n2024-01-01 00:00:00,100,ok\n2024-01-02 00:00:00,,fine\n";
        let table = SourceTable::read(csv.as_bytes(), "health", "Date").unwrap();

        assert_eq!(table.dates, vec![date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(table.column_names(), vec!["steps"]);
        assert_eq!(table.columns[0].values[0], 100.0);
        assert!(table.columns[0].values[1].is_nan());
    }

    #[test]
    fn test_read_keeps_trailing_space_in_header() {
        let csv = "Date,Variabilidad de Frecuencia Cardíaca (ms) \n2024-01-01,45\n";
        let table = SourceTable::read(csv.as_bytes(), "health", "Date").unwrap();
        assert_eq!(table.column_names(), vec![schema::HRV]);
    }

    #[test]
    fn test_read_accepts_short_rows() {
        let csv = "fecha,Temperature,Precipitation Total\n2024-01-01,10,0.2\n2024-01-02,11\n";
        let table = SourceTable::read(csv.as_bytes(), "weather", "fecha").unwrap();

        assert_eq!(table.dates, vec![date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(table.column_names(), vec!["Temperature", "Precipitation Total"]);
        assert_eq!(table.columns[0].values, vec![10.0, 11.0]);
        assert_eq!(table.columns[1].values[0], 0.2);
        assert!(table.columns[1].values[1].is_nan());
    }

    #[test]
    fn test_read_ignores_trailing_delimiter() {
        let csv = "Date,steps\n2024-01-01 00:00:00,100,\n2024-01-02 00:00:00,120,\n";
        let table = SourceTable::read(csv.as_bytes(), "health", "Date").unwrap();

        assert_eq!(table.dates, vec![date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(table.column_names(), vec!["steps"]);
        assert_eq!(table.columns[0].values, vec![100.0, 120.0]);
    }

    #[test]
    fn test_read_fails_on_malformed_date() {
        let csv = "fecha,Temperature\n2024-01-01,10\nnot-a-date,11\n";
        let result = SourceTable::read(csv.as_bytes(), "weather", "fecha");
        match result {
            Err(PipelineError::DateParse { row, value, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected a date parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_requires_date_column() {
        let csv = "day,Temperature\n2024-01-01,10\n";
        let result = SourceTable::read(csv.as_bytes(), "weather", "fecha");
        assert!(matches!(result, Err(PipelineError::MissingColumn { .. })));
    }

    #[test]
    fn test_inner_join_keeps_shared_dates_once() {
        let health = SourceTable {
            dates: vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 2), date(2024, 1, 4)],
            columns: vec![
                Column::new("hr", vec![60.0, 61.0, 99.0, 63.0]),
                Column::new("Temperature", vec![1.0, 2.0, 3.0, 4.0]),
            ],
        };
        let weather = SourceTable {
            dates: vec![date(2024, 1, 2), date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 1)],
            columns: vec![Column::new("Temperature", vec![12.0, 11.0, 13.0, 50.0])],
        };

        let joined = inner_join(health, weather).unwrap();

        assert_eq!(joined.dates(), &[date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(joined.column_names(), vec!["hr", "Temperature_x", "Temperature_y"]);
        assert_eq!(joined.column("hr").unwrap(), &[60.0, 61.0]);
        assert_eq!(joined.column("Temperature_y").unwrap(), &[11.0, 12.0]);
    }

    #[test]
    fn test_drop_all_null_columns() {
        let mut table = SourceTable {
            dates: vec![date(2024, 1, 1), date(2024, 1, 2)],
            columns: vec![
                Column::new("empty", vec![f64::NAN, f64::NAN]),
                Column::new("full", vec![1.0, f64::NAN]),
            ],
        };
        table.drop_all_null_columns();
        assert_eq!(table.column_names(), vec!["full"]);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = SourceBytes { health: b"a,b".to_vec(), weather: b"c".to_vec() };
        let b = SourceBytes { health: b"a".to_vec(), weather: b",bc".to_vec() };
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let loader = DataLoaderService::new(DataConfig {
            health_path: "/nonexistent/health.csv".into(),
            weather_path: "/nonexistent/weather.csv".into(),
        });
        assert!(matches!(loader.load(true), Err(PipelineError::Io { .. })));
    }
}
