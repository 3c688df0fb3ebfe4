use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::Context;

#[derive(Args)]
pub struct TrainCommand {
    /// Show the fitted coefficients
    #[arg(long)]
    coefficients: bool,
}

impl TrainCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let model = ctx.service.force_refresh()?;
        let report = model.metrics.report();

        if ctx.json {
            return ctx.print_json(&report);
        }

        println!("{}", "Model Evaluation".bold());
        println!("Version: {}", model.model_version);
        println!(
            "Rows: {} train, {} test",
            model.metrics.train.sample_count, model.metrics.test.sample_count
        );
        println!();
        println!("{:<8} {:>10} {:>10}", "", "train", "test");
        println!("{:<8} {:>10.3} {:>10.3}", "RMSE", report.rmse_train, report.rmse_test);
        println!("{:<8} {:>10.3} {:>10.3}", "MAE", report.mae_train, report.mae_test);
        println!("{:<8} {:>10} {:>10}", "MAPE", report.mape_train, report.mape_test);

        if self.coefficients {
            println!();
            println!("{}", "Coefficients".bold());
            println!("  {:<50} {:>10.4}", "(intercept)", model.intercept());
            for (feature, weight) in model.coefficients() {
                let line = format!("  {:<50} {:>10.4}", feature, weight);
                if weight == 0.0 {
                    println!("{}", line.dimmed());
                } else {
                    println!("{}", line);
                }
            }
        }

        Ok(())
    }
}
