use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use portfolio_api::cli::{Cli, Commands};
use portfolio_api::store::{DocumentStore, MemoryStore, PgStore};
use portfolio_api::{app, AppConfig, AppState, COLLECTIONS};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("portfolio_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting Portfolio API in {:?} mode", config.environment);

    match cli.command() {
        Commands::Migrate => migrate(&config).await,
        Commands::Serve { host, port } => serve(config, host, port).await,
    }
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let store = PgStore::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    store.ensure_collections(COLLECTIONS).await?;
    store.close().await;
    Ok(())
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let pg_store = match config.database.url {
        Some(_) => {
            let store = PgStore::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            store.ensure_collections(COLLECTIONS).await?;
            Some(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            None
        }
    };
    let store: Arc<dyn DocumentStore> = match &pg_store {
        Some(store) => Arc::new(store.clone()),
        None => Arc::new(MemoryStore::new()),
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Portfolio API listening on http://{}", bind_addr);

    let state = AppState::new(config, store);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(store) = pg_store {
        store.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
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
                tracing::error!("failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
