use std::sync::Arc;

use chess_tournament_api::config::config;
use chess_tournament_api::database::PgStore;
use chess_tournament_api::is_production;
use chess_tournament_api::server::{app, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SESSION_TTL_HOURS, etc.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = config();
    tracing::info!("Starting Chess Tournament API in {:?} mode", config.environment);

    // The pool is opened by the first request that needs it
    let store = Arc::new(PgStore::from_config(config)?);
    if let Some(url) = store.manager().redacted_url() {
        tracing::info!("Database: {}", url);
    } else {
        tracing::warn!("DATABASE_URL is not set; database-backed requests will fail");
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("♟  Chess Tournament API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(store.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.manager().close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) || is_production!();

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
