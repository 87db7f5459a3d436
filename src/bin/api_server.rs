// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over a trail CSV snapshot
// Usage: cargo run --features api --bin api_server

use std::net::SocketAddr;
use std::path::PathBuf;
use trail_recommender::{create_router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "trail_recommender=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let data_path = std::env::var("DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/WalkingKiwi_Tracks4.csv"));

    let config_path = std::env::var("CONFIG_PATH").ok().map(PathBuf::from);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    tracing::info!("Configuration:");
    tracing::info!("  DATA_PATH: {:?}", data_path);
    tracing::info!("  CONFIG_PATH: {:?}", config_path);
    tracing::info!("  PORT: {}", port);

    // Initialize application state (loads and validates the trail table)
    let state = AppState::load(&data_path, config_path.as_deref())?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
