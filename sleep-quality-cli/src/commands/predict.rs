use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use sleep_quality::models::{PredictionInput, QualityCategory};

use super::Context;

#[derive(Args)]
pub struct PredictCommand {
    /// Exercise minutes
    #[arg(long)]
    exercise_minutes: Option<f64>,

    /// Mean heart rate (bpm)
    #[arg(long)]
    heart_rate_mean: Option<f64>,

    /// Minimum heart rate (bpm)
    #[arg(long)]
    heart_rate_min: Option<f64>,

    /// Maximum heart rate (bpm)
    #[arg(long)]
    heart_rate_max: Option<f64>,

    /// Heart rate variability (ms)
    #[arg(long)]
    hrv: Option<f64>,

    /// Temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Relative humidity (%)
    #[arg(long)]
    humidity: Option<f64>,

    /// Mean sea level pressure (hPa)
    #[arg(long)]
    pressure: Option<f64>,

    /// Precipitation (mm)
    #[arg(long)]
    precipitation: Option<f64>,

    /// Wind gust (km/h)
    #[arg(long)]
    wind: Option<f64>,
}

impl PredictCommand {
    fn input(&self) -> PredictionInput {
        PredictionInput {
            exercise_minutes: self.exercise_minutes,
            heart_rate_mean: self.heart_rate_mean,
            heart_rate_min: self.heart_rate_min,
            heart_rate_max: self.heart_rate_max,
            hrv: self.hrv,
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            precipitation: self.precipitation,
            wind: self.wind,
        }
    }

    pub fn execute(self, ctx: &Context) -> Result<()> {
        let prediction = ctx
            .service
            .predict(&self.input())
            .map_err(|diagnostic| anyhow!("{}", diagnostic))?;

        if ctx.json {
            return ctx.print_json(&prediction);
        }

        let score = format!("{:.1}", prediction.score);
        let score = match prediction.category {
            QualityCategory::Excellent | QualityCategory::Good => score.green(),
            QualityCategory::Acceptable => score.yellow(),
            QualityCategory::Fair | QualityCategory::Poor => score.red(),
        };

        println!("Predicted sleep score: {} / 100 ({})", score.bold(), prediction.category.label());
        println!("{}", prediction.interpretation);

        if !prediction.skipped_fields.is_empty() {
            let skipped: Vec<&str> = prediction.skipped_fields.iter().map(|f| f.as_str()).collect();
            println!();
            println!(
                "{} {}",
                "Ignored (not in the dataset):".yellow(),
                skipped.join(", ")
            );
        }

        Ok(())
    }
}
