//! FlowHivee community service
//!
//! Serves the shared community message board to classroom devices on the local network.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowhivee::community::MessageFile;
use flowhivee::config::Config;
use flowhivee::db::{self, SqliteStore};
use flowhivee::registry::UserRegistry;
use flowhivee::storage::{Clock, KeyValueStore, SystemClock};
use flowhivee::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FlowHivee community service");
    tracing::info!("Message file: {:?}", config.messages_path);
    tracing::info!("State database: {:?}", config.state_db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Initialize state database
    let pool = db::init_database(&config.state_db_path).await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(pool));

    // One-off startup import of the device store into the user registry; no endpoint reads it
    let registry = UserRegistry::new(store, clock.clone());
    let imported = registry.rebuild_from_keys().await?;
    tracing::info!(
        "User registry ready with {} users ({} imported)",
        registry.users().await.len(),
        imported
    );

    let messages = Arc::new(MessageFile::open(&config.messages_path, clock).await?);

    let state = AppState { messages };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
