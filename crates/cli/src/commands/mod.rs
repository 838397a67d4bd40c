pub mod config_cmd;
pub mod draft;
pub mod models;
pub mod movements;
pub mod preview;

use std::sync::Arc;

use minuta_client::BackendClient;
use minuta_config::AppConfig;
use minuta_core::EventBus;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Load the configuration and build a backend client from it.
pub(crate) fn connect() -> Result<(AppConfig, Arc<BackendClient>), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let client = BackendClient::from_config(&config)
        .map_err(|e| format!("Failed to create HTTP client: {e}"))?;
    Ok((config, Arc::new(client)))
}

/// Log every draft event at debug level until the bus is dropped.
pub(crate) fn log_events(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(event = ?event, "Draft event"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Draft events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
