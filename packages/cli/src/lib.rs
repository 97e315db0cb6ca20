// ABOUTME: Library side of the flowcraft binary
// ABOUTME: Server startup, logging setup, and construction of the client-side store

use anyhow::Context;
use flowcraft_client::{AppStore, EventLog, HttpRemote};
use flowcraft_config::ClientConfig;
use std::sync::Arc;

pub mod logging;
pub mod server;

pub use server::{run_server, serve};

/// Store backed by the HTTP API and the local event log
pub fn open_store(config: &ClientConfig) -> anyhow::Result<AppStore> {
    let remote = HttpRemote::from_config(config)
        .with_context(|| format!("Failed to build API client for {}", config.api_url))?;
    let events = EventLog::new(config.events_path.clone());
    Ok(AppStore::new(Arc::new(remote), events))
}
