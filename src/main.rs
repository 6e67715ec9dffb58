//! Wallet Scanner API Server
//!
//! Usage:
//!   cargo run --bin wallet_scanner
//!
//! Environment:
//!   WALLET_ADDRESS    - Payment receiver (required unless PAYMENT_MODE=disabled)
//!   ETHERSCAN_API_KEY - Ledger history key
//!   GROQ_API_KEY      - Explanation model key
//!   PAYMENT_MODE      - body | header | disabled (default: body)
//!   PORT / HOST       - Listen address (default: 0.0.0.0:3000)
//!   RUST_LOG          - Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wallet_scanner::api::{create_router, start_cleanup_task, AppState};
use wallet_scanner::utils::constants::{APP_NAME, APP_VERSION};
use wallet_scanner::ScannerConfig;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("🚀 {} v{} starting", APP_NAME, APP_VERSION);

    let config = ScannerConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("💳 Payment mode: {}", config.payment_source.as_str());
    if config.payment_source.is_gated() {
        info!("💳 Payments go to {}", config.receiver_address);
    }

    let state = Arc::new(AppState::from_config(config)?);

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.clone());

    let app = create_router(state);

    info!("🌐 Listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /scan    - Payment-gated wallet risk scan");
    info!("  GET  /health  - Health check");

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 {} shutdown complete", APP_NAME);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
