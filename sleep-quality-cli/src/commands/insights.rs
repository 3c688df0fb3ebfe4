use anyhow::Result;
use clap::Args;
use colored::Colorize;
use sleep_quality::services::sleep_quality_service::DEFAULT_TOP_CORRELATIONS;

use super::Context;

#[derive(Args)]
pub struct StatsCommand {}

impl StatsCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let stats = ctx.service.target_statistics()?;

        if ctx.json {
            return ctx.print_json(&stats);
        }

        println!("{}", "Sleep Score Statistics".bold());
        println!();
        println!("Nights:  {}", stats.count);
        println!("Mean:    {:.2}", stats.mean);
        println!("Median:  {:.2}", stats.median);
        println!("Min:     {:.2}", stats.min);
        println!("Max:     {:.2}", stats.max);
        println!("Q1:      {:.2}", stats.q1);
        println!("Q3:      {:.2}", stats.q3);

        Ok(())
    }
}

#[derive(Args)]
pub struct CorrelationsCommand {
    /// Number of columns to show
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_CORRELATIONS)]
    top: usize,
}

impl CorrelationsCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let correlations = ctx.service.correlations(self.top)?;

        if ctx.json {
            return ctx.print_json(&correlations);
        }

        println!("{}", "Correlation with sleep score".bold());
        println!();
        for item in &correlations {
            let value = format!("{:>7.3}", item.correlation);
            let value = if item.correlation >= 0.0 {
                value.green()
            } else {
                value.red()
            };
            println!("{:<55} {} (n={})", item.feature, value, item.paired_samples);
        }

        Ok(())
    }
}
