use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::models::schema;

/// A named numeric column; missing cells are stored as NaN
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// True when every cell is missing
    pub fn is_all_null(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }
}

/// Joined daily measurements, one row per calendar date.
///
/// Columns are looked up by name only; their order follows the source files
/// and carries no meaning for the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecords {
    #[serde(rename = "fecha")]
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl DailyRecords {
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self> {
        for column in &columns {
            if column.values.len() != dates.len() {
                return Err(PipelineError::ShapeMismatch {
                    column: column.name.clone(),
                    expected: dates.len(),
                    actual: column.values.len(),
                });
            }
        }

        Ok(Self { dates, columns })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`DailyRecords::column`], failing with a schema error when absent
    pub fn require(&self, name: &str) -> Result<&[f64]> {
        self.column(name)
            .ok_or_else(|| PipelineError::missing_column("daily records", name))
    }

    /// Adds a column, replacing any existing column with the same name in place
    pub fn set_column(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.len() {
            return Err(PipelineError::ShapeMismatch {
                column: name.to_string(),
                expected: self.len(),
                actual: values.len(),
            });
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    /// Removes the named columns; names that are not present are ignored
    pub fn drop_columns(&mut self, names: &[&str]) {
        self.columns.retain(|c| !names.contains(&c.name.as_str()));
    }

    /// Keeps the rows whose mask entry is true
    pub fn retain_rows(&mut self, keep: &[bool]) {
        let mut mask = keep.iter();
        self.dates.retain(|_| *mask.next().unwrap_or(&false));
        for column in &mut self.columns {
            let mut mask = keep.iter();
            column.values.retain(|_| *mask.next().unwrap_or(&false));
        }
    }

    pub fn row_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.iter().position(|d| *d == date)
    }

    /// Value of a named column on a given row, `None` when the column is absent or the cell is missing
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        self.column(name)
            .and_then(|values| values.get(row).copied())
            .filter(|v| !v.is_nan())
    }
}

/// Feature matrix with named columns, rows in dataset order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureFrame {
    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Subset of rows, in the order given
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.select(Axis(0), rows),
        }
    }

    /// Per-column mean over the non-missing cells; NaN for an all-missing column
    pub fn column_means(&self) -> Array1<f64> {
        self.values
            .axis_iter(Axis(1))
            .map(|column| nan_mean(column.iter().copied()))
            .collect()
    }
}

/// Mean of the non-NaN values, NaN when there are none
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// The four sleep stages of one night, as shown for a single date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageShare {
    pub stage: String,
    pub hours: f64,
    /// Share of the summed stage hours, 0.0 to 1.0
    pub share: f64,
}

/// Sleep breakdown for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepDay {
    pub date: NaiveDate,
    pub total_hours: Option<f64>,
    pub category: Option<crate::models::QualityCategory>,
    pub stages: Vec<StageShare>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub target: Option<f64>,
}

impl SleepDay {
    pub(crate) const STAGES: [(&'static str, &'static str); 4] = [
        ("Core", schema::SLEEP_CORE),
        ("Deep", schema::SLEEP_DEEP),
        ("REM", schema::SLEEP_REM),
        ("Awake", schema::SLEEP_AWAKE),
    ];
}
