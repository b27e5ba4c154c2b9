pub mod commands;
pub mod config;
pub mod db;
pub mod feedback;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::db::SqliteStore;
use crate::state::AppState;

/// Install the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Open the database named by `config` and wire up the services.
pub fn open_state(config: &AppConfig) -> anyhow::Result<AppState> {
    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_dir)?;

    let db_path = config.db_path();
    tracing::info!(path = %db_path.display(), "opening database");
    let store = SqliteStore::open(&db_path)?;
    Ok(AppState::new(store, chrono::Utc::now())?)
}
