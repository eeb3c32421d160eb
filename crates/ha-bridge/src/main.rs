//! Bridge runner
//!
//! Usage: `ha-bridge [CONFIG]` (defaults to `bridge.yaml`).
//!
//! Reads JSON lines from stdin: hub messages (`type: event`) and appliance
//! transitions (`type: transition`). Service calls go out on stdout, one JSON
//! object per line; logs go to stderr.

use anyhow::{Context, Result};
use ha_bridge::{Bridge, Outcome};
use ha_config::load_bridge_config;
use ha_core::ServiceCallMessage;
use ha_service_registry::{ServiceError, ServiceRegistry};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "bridge.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = load_bridge_config(&path)
        .with_context(|| format!("loading bridge configuration from {}", path))?;

    let services = Arc::new(ServiceRegistry::new());
    let mut bridge = Bridge::from_config(&config, services.clone())?;

    // Every service the commands call is written to stdout for the hub connection
    for (domain, service) in bridge.services() {
        services.register(domain, service, |message: ServiceCallMessage| async move {
            let line = serde_json::to_string(&message)
                .map_err(|e| ServiceError::CallFailed(e.to_string()))?;
            println!("{}", line);
            Ok::<_, ServiceError>(())
        });
    }

    info!(config = %path, "Bridge running, reading stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match bridge.handle_line(&line).await {
            Ok(Outcome::Fired(fired)) => {
                for fired in fired {
                    info!(
                        entity_id = %fired.entity_id,
                        events = ?fired.events,
                        state = ?fired.new,
                        "Appliance event"
                    );
                }
            }
            Ok(Outcome::Sent(sent)) => {
                info!(count = sent.len(), "Transition handled");
            }
            Ok(Outcome::Ignored) => {}
            Err(e) => warn!(error = %e, "Skipping input line"),
        }
    }

    info!("Input closed, shutting down");
    Ok(())
}
