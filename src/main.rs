use anyhow::{Context, Result};
use sleep_quality::api::create_routes;
use sleep_quality::{Config, SleepQualityService};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("SLEEP_QUALITY_CONFIG").ok().map(PathBuf::from);
    let config = Config::from_env(config_path.as_deref())?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let service = Arc::new(SleepQualityService::new(&config));

    // Train up front so the first prediction is served from the cache
    let warm_service = service.clone();
    match tokio::task::spawn_blocking(move || warm_service.trained_model()).await {
        Ok(Ok(model)) => info!("Model {} ready", model.model_version),
        Ok(Err(e)) => warn!("Initial training failed, will retry on first request: {}", e),
        Err(e) => warn!("Initial training task failed: {}", e),
    }

    let app = create_routes(service);

    let address = config.server.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!(
        "Sleep quality server starting on http://{} ({})",
        address, config.server.environment
    );
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
