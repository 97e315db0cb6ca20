// ABOUTME: API server startup and shutdown
// ABOUTME: Opens the store of record, builds the router, and serves until Ctrl+C

use anyhow::Context;
use flowcraft_api::{create_router, ApiState};
use flowcraft_config::ServerConfig;
use flowcraft_storage::connect;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Open the database named in `config` and serve until interrupted
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let pool = connect(&config.database_path).await.with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })?;
    info!("Using database {}", config.database_path.display());

    let state = ApiState::new(pool, config.cors.clone());

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve(listener, state, shutdown_signal()).await
}

/// Serve the API on an already-bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Flowcraft API listening on http://{}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
