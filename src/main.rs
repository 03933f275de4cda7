//! tourops-engine server entry point.
//!
//! Serves the engine's JSON adapter over HTTP.

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tourops_engine::api::{self, AppState};
use tourops_engine::config::EngineConfig;
use tourops_engine::TourEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = EngineConfig::from_env();
    tracing::info!(
        addr = %config.listen_addr,
        default_timezone = %config.default_timezone,
        max_range_days = config.max_range_days,
        "starting tourops-engine"
    );

    let listen_addr = config.listen_addr;
    let state = AppState::new(TourEngine::new(config));

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
