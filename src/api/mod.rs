// HTTP routes and handlers

pub mod analytics;
pub mod error;
pub mod health;
pub mod predictions;
pub mod routes;

pub use error::ApiError;
pub use routes::{create_routes, AppState};
