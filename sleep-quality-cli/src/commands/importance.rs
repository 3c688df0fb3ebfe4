use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::Context;

const BAR_WIDTH: f64 = 40.0;

#[derive(Args)]
pub struct ImportanceCommand {}

impl ImportanceCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let ranked = ctx.service.feature_importance()?;

        if ctx.json {
            return ctx.print_json(&ranked);
        }

        println!("{}", "Feature Importance".bold());
        println!();
        for feature in &ranked {
            let bar = "█".repeat((feature.importance * BAR_WIDTH).round() as usize);
            println!("{:<50} {:>6.3} {}", feature.feature, feature.importance, bar.cyan());
        }

        Ok(())
    }
}
