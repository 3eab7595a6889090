//! # Gate Runtime Binary
//!
//! Runs the membership gate over the in-memory user store until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use gate_runtime::{GateRuntime, RuntimeConfig};
use gate_telemetry::{init_telemetry, TelemetryConfig};
use membership_gate::InMemoryUserStore;

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("initializing logging")?;

    let config = RuntimeConfig::from_env().context("loading runtime configuration")?;

    let store = Arc::new(InMemoryUserStore::new());
    if config.seed_sample_users {
        store.seed_if_empty();
    }

    let mut runtime = GateRuntime::initialize(store, config)
        .await
        .context("building membership gate from store")?;
    runtime.start();

    let stats = runtime.service().current_filter_stats();
    info!(
        stats = %serde_json::to_string(&stats)?,
        "Gate is running. Press Ctrl+C to stop."
    );
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
