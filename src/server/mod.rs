//! HTTP query surface
//!
//! Read-only JSON endpoints over one frozen aggregation report. Handlers share
//! the report through [`QueryService`] and never mutate it.

mod routes;

pub use routes::{app, AppState};

use crate::services::QueryService;
use crate::types::{Result, SubtrackError};

/// Bind `addr` and serve until Ctrl+C
pub async fn serve(addr: &str, query: QueryService) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SubtrackError::Server(format!("cannot bind {}: {}", addr, e)))?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "serving query API");
    eprintln!("Listening on http://{}", local);

    axum::serve(listener, app(AppState { query }))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SubtrackError::Server(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

/// Blocking entry point for the CLI
pub fn run(addr: &str, query: QueryService) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(addr, query))?;
    Ok(())
}
