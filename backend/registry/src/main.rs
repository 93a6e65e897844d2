//! Conservation DAO registry — entry point.
//!
//! Opens the configured key/value store and serves the project, forum and
//! reveal endpoints over a small Axum REST API.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use dao_registry::api::{self, ApiState, SharedStore};
use dao_registry::config::{Config, StoreBackend};
use dao_registry::db::SqliteStore;
use dao_registry::reveal::RevealSession;
use dao_registry::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let store: SharedStore = match config.store_backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&config.database_url).await?),
        StoreBackend::Memory => {
            info!("Using in-memory store; nothing will survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Fixed for the life of the process; every reveal challenge quotes it.
    let session = RevealSession::new(config.contract_address.clone(), config.chain_id)
        .with_duration_days(config.reveal_duration_days);
    info!(
        "Reveal session started at {} for contract {} on chain {}",
        session.start_timestamp, session.contract_address, session.chain_id
    );

    let state = Arc::new(ApiState::new(
        store,
        session,
        Duration::from_millis(config.reveal_delay_ms),
    ));
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
