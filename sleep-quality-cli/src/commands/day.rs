use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;

use super::Context;

#[derive(Args)]
pub struct DayCommand {
    /// Date to show (YYYY-MM-DD)
    date: NaiveDate,
}

impl DayCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let night = ctx.service.sleep_day(self.date)?;

        if ctx.json {
            return ctx.print_json(&night);
        }

        println!("{}", format!("Sleep on {}", night.date).bold());
        println!();

        match (night.total_hours, night.category) {
            (Some(hours), Some(category)) => {
                println!("Total: {:.1} h ({})", hours, category.label())
            }
            _ => println!("Total: -"),
        }

        for stage in &night.stages {
            println!(
                "  {:<6} {:>5.2} h {:>5.1}%",
                stage.stage,
                stage.hours,
                stage.share * 100.0
            );
        }

        if let Some(temperature) = night.temperature {
            println!("Temperature: {:.1} °C", temperature);
        }
        if let Some(precipitation) = night.precipitation {
            println!("Precipitation: {:.1} mm", precipitation);
        }
        if let Some(score) = night.target {
            println!("Sleep score: {:.1}", score);
        }

        Ok(())
    }
}

#[derive(Args)]
pub struct DatesCommand {
    /// Number of dates to show, newest first
    #[arg(short, long, default_value = "10")]
    limit: usize,
}

impl DatesCommand {
    pub fn execute(self, ctx: &Context) -> Result<()> {
        let mut dates = ctx.service.dates()?;
        dates.truncate(self.limit);

        if ctx.json {
            return ctx.print_json(&dates);
        }

        for date in dates {
            println!("{}", date);
        }

        Ok(())
    }
}
