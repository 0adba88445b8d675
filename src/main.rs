use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use solar_telemetry_service::{
    api::{self, AppState},
    config::Config,
    db::{self, MemoryReadingStore, ReadingStore, SqliteReadingStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env; a missing file is fine when env vars are set externally
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    // Open the reading store
    let store: Arc<dyn ReadingStore> = if config.uses_memory_store() {
        warn!("DATABASE_URL=memory: readings will not survive a restart");
        Arc::new(MemoryReadingStore::new())
    } else {
        let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
        db::run_migrations(&pool).await?;
        info!(database_url = %config.database_url, "Database ready");
        Arc::new(SqliteReadingStore::new(pool))
    };

    let state = AppState::new(store, config.dashboard_limit);

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
