mod backend_client;
mod catalog;
mod config;
mod errors;
mod matching;
mod models;
mod routes;
mod skills;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend_client::BackendClient;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvmatch v{}", env!("CARGO_PKG_VERSION"));

    // One client for storage, statistics and scoring
    let backend = BackendClient::new(&config.match_backend_url, config.backend_timeout)?;
    info!(
        "Matching backend at {} (timeout {}s)",
        config.match_backend_url,
        config.backend_timeout.as_secs()
    );

    let matcher = Arc::new(backend.clone());
    let state = AppState::new(config.clone(), backend, matcher);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the front-end host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
