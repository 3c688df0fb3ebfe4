//! Sleep quality scoring from joined health and weather data.
//!
//! Two daily datasets are joined on calendar date, labelled with a 0-100
//! composite sleep score, and used to fit an elastic net that predicts the
//! score from same-day inputs. [`services::SleepQualityService`] is the entry
//! point; [`api`] exposes it over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{Diagnostic, ErrorKind, PipelineError};
pub use services::SleepQualityService;
