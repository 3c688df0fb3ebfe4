use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::schema;
use crate::models::DailyRecords;

/// Hours of sleep that earn the full duration score
pub const IDEAL_SLEEP_HOURS: f64 = 8.0;
pub const DURATION_POINTS: f64 = 50.0;

/// Share of the night spent in deep sleep that earns the full deep score
pub const IDEAL_DEEP_RATIO: f64 = 0.20;
/// Share of the night spent in REM that earns the full REM score
pub const IDEAL_REM_RATIO: f64 = 0.25;
/// Points per stage term; deep and REM together make up the quality score
pub const STAGE_POINTS: f64 = 15.0;

pub const RECOVERY_POINTS: f64 = 20.0;

/// Duration component, 0 to 50. NaN stays NaN.
pub fn duration_score(total_hours: f64) -> f64 {
    (total_hours / IDEAL_SLEEP_HOURS * DURATION_POINTS).clamp(0.0, DURATION_POINTS)
}

/// One stage term of the quality component, 0 to 15. NaN stays NaN.
pub fn stage_score(ratio: f64, ideal_ratio: f64) -> f64 {
    (ratio / ideal_ratio * STAGE_POINTS).clamp(0.0, STAGE_POINTS)
}

/// Recovery component from an HRV value already min-max normalized over the dataset
pub fn recovery_score(hrv_norm: f64) -> f64 {
    hrv_norm * RECOVERY_POINTS
}

/// Minimum and maximum over the non-missing values; NaN when all are missing
pub fn nan_min_max(values: &[f64]) -> (f64, f64) {
    let view = ArrayView1::from(values);
    (*view.min_skipnan(), *view.max_skipnan())
}

/// Derives the composite 0-100 sleep score from the joined measurements
#[derive(Debug, Clone, Default)]
pub struct LabelSynthesisService;

impl LabelSynthesisService {
    pub fn new() -> Self {
        Self
    }

    /// Append the sub-score columns and `target`.
    ///
    /// HRV is normalized against the minimum and maximum of the rows passed
    /// in. Division by a zero total or a constant HRV yields NaN or infinity,
    /// which is kept as is.
    pub fn synthesize(&self, records: &mut DailyRecords) -> Result<()> {
        let total = records.require(schema::SLEEP_TOTAL)?.to_vec();
        let deep = records.require(schema::SLEEP_DEEP)?.to_vec();
        let rem = records.require(schema::SLEEP_REM)?.to_vec();
        let hrv = records.require(schema::HRV)?.to_vec();

        let score_duration: Vec<f64> = total.iter().map(|&t| duration_score(t)).collect();

        let deep_ratio: Vec<f64> = deep.iter().zip(&total).map(|(d, t)| d / t).collect();
        let rem_ratio: Vec<f64> = rem.iter().zip(&total).map(|(r, t)| r / t).collect();

        let score_deep: Vec<f64> = deep_ratio
            .iter()
            .map(|&r| stage_score(r, IDEAL_DEEP_RATIO))
            .collect();
        let score_rem: Vec<f64> = rem_ratio
            .iter()
            .map(|&r| stage_score(r, IDEAL_REM_RATIO))
            .collect();
        let score_quality: Vec<f64> = score_deep.iter().zip(&score_rem).map(|(d, r)| d + r).collect();

        let (hrv_min, hrv_max) = nan_min_max(&hrv);
        debug!("HRV range over {} rows: {} - {}", hrv.len(), hrv_min, hrv_max);
        let hrv_norm: Vec<f64> = hrv
            .iter()
            .map(|&h| (h - hrv_min) / (hrv_max - hrv_min))
            .collect();
        let score_recovery: Vec<f64> = hrv_norm.iter().map(|&n| recovery_score(n)).collect();

        let target: Vec<f64> = score_duration
            .iter()
            .zip(&score_quality)
            .zip(&score_recovery)
            .map(|((d, q), r)| d + q + r)
            .collect();

        records.set_column(schema::SCORE_DURATION, score_duration)?;
        records.set_column(schema::DEEP_RATIO, deep_ratio)?;
        records.set_column(schema::REM_RATIO, rem_ratio)?;
        records.set_column(schema::SCORE_DEEP, score_deep)?;
        records.set_column(schema::SCORE_REM, score_rem)?;
        records.set_column(schema::SCORE_QUALITY, score_quality)?;
        records.set_column(schema::HRV_NORM, hrv_norm)?;
        records.set_column(schema::SCORE_RECOVERY, score_recovery)?;
        records.set_column(schema::TARGET, target)?;

        Ok(())
    }

    /// Drop helper and discarded source columns, then rows missing a sleep stage or the target
    pub fn prepare_training_set(&self, records: &mut DailyRecords) -> Result<()> {
        records.drop_columns(&schema::DISCARDED_SOURCE_COLUMNS);
        records.drop_columns(&schema::HELPER_COLUMNS);

        let required = schema::REQUIRED_COLUMNS
            .iter()
            .map(|name| records.require(name))
            .collect::<Result<Vec<_>>>()?;

        let keep: Vec<bool> = (0..records.len())
            .map(|row| required.iter().all(|column| !column[row].is_nan()))
            .collect();

        let before = records.len();
        records.retain_rows(&keep);
        info!(
            "Kept {} of {} rows with complete sleep stages and target",
            records.len(),
            before
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Column;
    use chrono::NaiveDate;

    fn records(rows: &[(f64, f64, f64, f64)]) -> DailyRecords {
        let dates = (0..rows.len())
            .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap())
            .collect();
        let col = |f: fn(&(f64, f64, f64, f64)) -> f64| rows.iter().map(f).collect::<Vec<_>>();

        DailyRecords::new(
            dates,
            vec![
                Column::new(schema::SLEEP_TOTAL, col(|r| r.0)),
                Column::new(schema::SLEEP_CORE, col(|r| r.0 / 2.0)),
                Column::new(schema::SLEEP_DEEP, col(|r| r.1)),
                Column::new(schema::SLEEP_REM, col(|r| r.2)),
                Column::new(schema::SLEEP_AWAKE, vec![0.5; rows.len()]),
                Column::new(schema::HRV, col(|r| r.3)),
                Column::new("Growing Degree Days", vec![1.0; rows.len()]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_reference_night() {
        let mut data = records(&[(8.0, 1.4, 1.8, 80.0), (6.0, 1.0, 1.0, 20.0)]);
        LabelSynthesisService::new().synthesize(&mut data).unwrap();

        assert_eq!(data.column(schema::SCORE_DURATION).unwrap()[0], 50.0);
        assert!((data.column(schema::SCORE_DEEP).unwrap()[0] - 13.125).abs() < 1e-9);
        assert!((data.column(schema::SCORE_REM).unwrap()[0] - 13.5).abs() < 1e-9);
        assert_eq!(data.column(schema::SCORE_RECOVERY).unwrap()[0], 20.0);
        assert!((data.column(schema::TARGET).unwrap()[0] - 96.625).abs() < 1e-9);

        // lowest HRV in the dataset earns no recovery points
        assert_eq!(data.column(schema::SCORE_RECOVERY).unwrap()[1], 0.0);
    }

    #[test]
    fn test_sub_scores_clip() {
        assert_eq!(duration_score(12.0), 50.0);
        assert_eq!(duration_score(-1.0), 0.0);
        assert_eq!(stage_score(0.5, IDEAL_DEEP_RATIO), 15.0);
        assert_eq!(stage_score(f64::INFINITY, IDEAL_REM_RATIO), 15.0);
        assert!(stage_score(f64::NAN, IDEAL_REM_RATIO).is_nan());
    }

    #[test]
    fn test_zero_total_produces_nan_and_is_filtered() {
        let mut data = records(&[(0.0, 0.0, 0.0, 40.0), (7.0, 1.2, 1.5, 60.0), (7.5, 1.0, 2.0, 50.0)]);
        let service = LabelSynthesisService::new();
        service.synthesize(&mut data).unwrap();

        assert!(data.column(schema::DEEP_RATIO).unwrap()[0].is_nan());
        assert!(data.column(schema::TARGET).unwrap()[0].is_nan());

        service.prepare_training_set(&mut data).unwrap();
        assert_eq!(data.len(), 2);
        assert!(!data.has_column(schema::SCORE_DEEP));
        assert!(!data.has_column("Growing Degree Days"));
        assert!(data.has_column(schema::TARGET));
    }

    #[test]
    fn test_constant_hrv_propagates_nan() {
        let mut data = records(&[(8.0, 1.6, 2.0, 50.0), (7.0, 1.4, 1.75, 50.0)]);
        LabelSynthesisService::new().synthesize(&mut data).unwrap();
        assert!(data.column(schema::HRV_NORM).unwrap().iter().all(|v| v.is_nan()));
        assert!(data.column(schema::TARGET).unwrap().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_missing_hrv_column_is_schema_error() {
        let mut data = records(&[(8.0, 1.6, 2.0, 50.0)]);
        data.drop_columns(&[schema::HRV]);
        let result = LabelSynthesisService::new().synthesize(&mut data);
        assert!(matches!(
            result,
            Err(crate::error::PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_nan_min_max_skips_missing() {
        assert_eq!(nan_min_max(&[f64::NAN, 3.0, 1.0, 2.0]), (1.0, 3.0));
        let (min, max) = nan_min_max(&[f64::NAN, f64::NAN]);
        assert!(min.is_nan() && max.is_nan());
    }
}
