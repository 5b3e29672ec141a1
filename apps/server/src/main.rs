//! # Stockroom Server
//!
//! HTTP API for purchase order receiving and inventory reconciliation.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging      tracing-subscriber, RUST_LOG overrides      │
//! │  2. Load configuration      STOCKROOM_* environment variables           │
//! │  3. Open database           SQLite (WAL), run pending migrations        │
//! │  4. Serve                   axum on STOCKROOM_HOST:STOCKROOM_PORT       │
//! │  5. Shutdown                Ctrl+C / SIGTERM, then close the pool       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use stockroom_db::{Database, DbConfig};
use stockroom_server::config::ServerConfig;
use stockroom_server::{create_app, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Stockroom server...");

    let config = ServerConfig::load()?;
    info!(
        addr = %config.socket_addr(),
        db_path = %config.database_path.display(),
        max_connections = config.db_max_connections,
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.database_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .with_context(|| format!("opening database {}", config.database_path.display()))?;
    info!("Database connected and migrations applied");

    let app = create_app(AppState::new(db.clone()));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom=trace` - Show trace for stockroom crates only
/// - Default: `info,stockroom=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
