use chrono::NaiveDate;
use statrs::statistics::{Data, Median, OrderStatistics, Statistics};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::schema;
use crate::models::{
    CorrelationMatrix, DailyRecords, FeatureCorrelation, QualityCategory, SleepDay, StageShare,
    TargetStatistics,
};

/// Pearson correlation over the rows where both values are present.
///
/// Returns the coefficient and the number of paired rows; NaN when fewer
/// than two pairs exist or either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> (f64, usize) {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();

    let n = xs.len();
    if n < 2 {
        return (f64::NAN, n);
    }

    let covariance = xs.iter().covariance(ys.iter());
    let denominator = xs.iter().std_dev() * ys.iter().std_dev();
    if denominator == 0.0 {
        return (f64::NAN, n);
    }
    (covariance / denominator, n)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Read-only summaries over loaded daily records
#[derive(Debug, Clone, Default)]
pub struct DataInsightsService;

impl DataInsightsService {
    pub fn new() -> Self {
        Self
    }

    /// Count, range, mean and quartiles of the non-missing scores
    pub fn target_statistics(&self, records: &DailyRecords) -> Result<TargetStatistics> {
        let scores: Vec<f64> = records
            .require(schema::TARGET)?
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .collect();

        if scores.is_empty() {
            return Err(PipelineError::InsufficientData(
                "no scored rows to summarise".to_string(),
            ));
        }

        let count = scores.len();
        let mean = Statistics::mean(scores.iter());
        let min = Statistics::min(scores.iter());
        let max = Statistics::max(scores.iter());
        let mut data = Data::new(scores);

        Ok(TargetStatistics {
            count,
            min,
            max,
            mean,
            median: data.median(),
            q1: data.lower_quartile(),
            q3: data.upper_quartile(),
        })
    }

    /// Correlation of every other column with the score, strongest first.
    ///
    /// Columns whose correlation is undefined are ranked last.
    pub fn target_correlations(&self, records: &DailyRecords, top_n: usize) -> Result<Vec<FeatureCorrelation>> {
        let target = records.require(schema::TARGET)?;

        let mut correlations: Vec<FeatureCorrelation> = records
            .columns()
            .iter()
            .filter(|c| c.name != schema::TARGET)
            .map(|c| {
                let (correlation, paired_samples) = pearson(&c.values, target);
                FeatureCorrelation {
                    feature: c.name.clone(),
                    correlation,
                    paired_samples,
                }
            })
            .collect();

        correlations.sort_by(|a, b| match (a.correlation.is_nan(), b.correlation.is_nan()) {
            (false, false) => b.correlation.abs().total_cmp(&a.correlation.abs()),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        correlations.truncate(top_n);

        debug!("Ranked {} correlations with the score", correlations.len());
        Ok(correlations)
    }

    /// Pairwise correlations between the named columns, or between all
    /// columns when `names` is empty. Values are rounded to two decimals.
    pub fn correlation_matrix(&self, records: &DailyRecords, names: &[&str]) -> Result<CorrelationMatrix> {
        let names: Vec<&str> = if names.is_empty() {
            records.column_names()
        } else {
            names.to_vec()
        };

        let columns = names
            .iter()
            .map(|name| records.require(name))
            .collect::<Result<Vec<_>>>()?;

        let values = columns
            .iter()
            .map(|x| columns.iter().map(|y| round2(pearson(x, y).0)).collect())
            .collect();

        Ok(CorrelationMatrix {
            names: names.into_iter().map(str::to_string).collect(),
            values,
        })
    }

    /// Every date in the records, newest first
    pub fn available_dates(&self, records: &DailyRecords) -> Vec<NaiveDate> {
        let mut dates = records.dates().to_vec();
        dates.sort_unstable_by(|a, b| b.cmp(a));
        dates
    }

    /// Sleep stage breakdown, weather and score of one night
    pub fn sleep_day(&self, records: &DailyRecords, date: NaiveDate) -> Result<SleepDay> {
        let row = records.row_of(date).ok_or(PipelineError::DateNotFound(date))?;

        let hours: Vec<(&str, f64)> = SleepDay::STAGES
            .iter()
            .filter_map(|(stage, column)| records.value(row, column).map(|h| (*stage, h)))
            .collect();
        let stage_total: f64 = hours.iter().map(|(_, h)| h).sum();

        let stages = hours
            .into_iter()
            .map(|(stage, hours)| StageShare {
                stage: stage.to_string(),
                hours,
                share: if stage_total > 0.0 { hours / stage_total } else { 0.0 },
            })
            .collect();

        let total_hours = records.value(row, schema::SLEEP_TOTAL);

        Ok(SleepDay {
            date,
            total_hours,
            category: total_hours.map(QualityCategory::from_sleep_hours),
            stages,
            temperature: records.value(row, schema::TEMPERATURE),
            precipitation: records.value(row, schema::PRECIPITATION),
            target: records.value(row, schema::TARGET),
        })
    }
}
