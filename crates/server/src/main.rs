//! palmlines REST API server

mod config;
mod routes;

use anyhow::{Context, Result};
use config::ServerConfig;
use routes::AppState;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    for dir in [&config.upload_dir, &config.result_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let addr = config.addr.clone();
    let app = routes::router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
