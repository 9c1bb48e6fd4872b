//! Vehicle Ledger - API Server Binary
//!
//! Starts the HTTP API over the ledger record gateway.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin vehicle-ledger-api
//!
//! # Run against a provisioned network
//! LEDGER_WALLET_PATH=./wallet LEDGER_PROFILE_PATH=./connection-org1.json \
//!     cargo run --bin vehicle-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 3000)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `LEDGER_WALLET_PATH` - Wallet directory (default: wallet)
//! * `LEDGER_PROFILE_PATH` - Connection profile (default: connection-org1.json)
//! * `LEDGER_IDENTITY` - Wallet alias (default: appUser)
//! * `LEDGER_CHANNEL` - Channel name (default: mychannel)
//! * `LEDGER_CONTRACT` - Contract name (default: fabcar)
//! * `LEDGER_CONNECT_TIMEOUT_SECS` / `LEDGER_REQUEST_TIMEOUT_SECS` - pipeline bounds

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_records::RecordGateway;
use infra_ledger::{ConnectionProfile, FileWallet, NetworkConnector};
use interface_api::config::{ApiConfig, LedgerConfig};
use interface_api::create_router;

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the gateway over the
/// provisioned wallet and connection profile, and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The connection profile cannot be read
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let api_config = ApiConfig::from_env().context("loading API configuration")?;
    let ledger_config = LedgerConfig::from_env().context("loading ledger configuration")?;

    // Initialize tracing/logging
    init_tracing(&api_config.log_level);

    tracing::info!(
        host = %api_config.host,
        port = %api_config.port,
        channel = %ledger_config.channel,
        contract = %ledger_config.contract,
        "Starting Vehicle Ledger API Server"
    );

    // Wire the gateway over the provisioned artifacts
    let profile = ConnectionProfile::load(&ledger_config.profile_path)
        .await
        .with_context(|| format!("loading connection profile {}", ledger_config.profile_path))?;
    let wallet = FileWallet::new(&ledger_config.wallet_path);
    let connector = NetworkConnector::new(profile)
        .connect_timeout(ledger_config.connect_timeout())
        .request_timeout(ledger_config.request_timeout());

    let gateway = Arc::new(RecordGateway::new(
        Arc::new(wallet),
        Arc::new(connector),
        ledger_config.gateway_config(),
    ));

    // Create the API router
    let app = create_router(gateway);

    // Parse server address
    let addr: SocketAddr = api_config
        .server_addr()
        .parse()
        .context("parsing server address")?;

    tracing::info!(%addr, "Server listening");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
