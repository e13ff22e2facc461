use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sssf_api_rust::api::{build_router, AppState};
use sssf_api_rust::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = config::config().clone();
    if let Err(problem) = config.validate() {
        anyhow::bail!("invalid configuration: {}", problem);
    }
    tracing::info!("Starting SSSF API in {:?} mode", config.environment);

    let port = config.server.port;
    let state = AppState::from_config(config)
        .await
        .context("failed to initialise application state")?;
    tracing::info!("Using {:?} store", state.store.backend());

    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("SSSF API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
