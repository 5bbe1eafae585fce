//! API binary entry point.

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vedit_api::{create_router, ApiConfig, AppState};
use vedit_queue::JobQueue;
use vedit_storage::MediaLibrary;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ApiConfig::from_env();

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder unavailable: {}", e);
            None
        }
    };

    let library = MediaLibrary::from_env().await?;
    let queue = JobQueue::from_env()?;

    let state = AppState::new(config.clone(), library, queue, metrics);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("API listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
