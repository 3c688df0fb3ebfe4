mod day;
mod importance;
mod insights;
mod predict;
mod train;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sleep_quality::{Config, SleepQualityService};
use std::path::PathBuf;

pub use day::{DatesCommand, DayCommand};
pub use importance::ImportanceCommand;
pub use insights::{CorrelationsCommand, StatsCommand};
pub use predict::PredictCommand;
pub use train::TrainCommand;

#[derive(Parser)]
#[command(name = "sleep-quality")]
#[command(about = "Sleep quality scoring from health and weather data", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "SLEEP_QUALITY_CONFIG")]
    config: Option<PathBuf>,

    /// Health dataset (overrides configuration)
    #[arg(long, global = true)]
    health: Option<PathBuf>,

    /// Weather dataset (overrides configuration)
    #[arg(long, global = true)]
    weather: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model and show its error metrics
    Train(TrainCommand),

    /// Predict the sleep score from same-day inputs
    Predict(PredictCommand),

    /// Rank features by importance
    Importance(ImportanceCommand),

    /// Show sleep score statistics
    Stats(StatsCommand),

    /// Rank columns by correlation with the sleep score
    Correlations(CorrelationsCommand),

    /// Show the sleep breakdown of one night
    Day(DayCommand),

    /// List dates with joined records
    Dates(DatesCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// What every command needs: the pipeline service and the output format
pub struct Context {
    pub service: SleepQualityService,
    pub json: bool,
}

impl Context {
    /// Print a value as pretty JSON
    pub fn print_json(&self, value: &impl serde::Serialize) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

impl Cli {
    fn context(&self) -> Result<Context> {
        let mut config = Config::from_env(self.config.as_deref())?;
        if let Some(path) = &self.health {
            config.data.health_path = path.clone();
        }
        if let Some(path) = &self.weather {
            config.data.weather_path = path.clone();
        }
        tracing::debug!(
            "Datasets: {:?}, {:?}",
            config.data.health_path,
            config.data.weather_path
        );

        Ok(Context {
            service: SleepQualityService::new(&config),
            json: self.json,
        })
    }

    pub fn execute(self) -> Result<()> {
        if let Commands::Completions { shell } = self.command {
            generate_completions(shell);
            return Ok(());
        }

        let ctx = self.context()?;
        match self.command {
            Commands::Train(cmd) => cmd.execute(&ctx),
            Commands::Predict(cmd) => cmd.execute(&ctx),
            Commands::Importance(cmd) => cmd.execute(&ctx),
            Commands::Stats(cmd) => cmd.execute(&ctx),
            Commands::Correlations(cmd) => cmd.execute(&ctx),
            Commands::Day(cmd) => cmd.execute(&ctx),
            Commands::Dates(cmd) => cmd.execute(&ctx),
            Commands::Completions { .. } => Ok(()),
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
