//! # Gate Runtime
//!
//! Hosts a [`RegistrationService`] and keeps its filter fresh:
//!
//! - every `rebuild_interval` the filter is rebuilt from the store
//! - every `saturation_check_interval` it is rebuilt if the item counter
//!   has reached the configured saturation point
//!
//! Rebuild failures are logged and the previous filter keeps serving.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Seed the store with sample users if it is empty
//! 3. Build the membership gate from the store
//! 4. Start the maintenance task
//! 5. Wait for Ctrl+C, then signal shutdown

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use membership_gate::{FilterConfig, GateError, RegistrationService, UniqueKeyStore};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info};

pub use config::RuntimeConfig;

/// Shortest period either ticker runs at; tokio rejects a zero period.
const MIN_TICK: Duration = Duration::from_secs(1);

/// The runtime owning the service and its background maintenance task.
pub struct GateRuntime<S: UniqueKeyStore + 'static> {
    service: Arc<RegistrationService<S>>,
    config: RuntimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver, cloned into each task.
    shutdown_rx: watch::Receiver<bool>,
    maintenance: Option<JoinHandle<()>>,
}

impl<S: UniqueKeyStore + 'static> GateRuntime<S> {
    pub fn new(service: Arc<RegistrationService<S>>, config: RuntimeConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            service,
            config,
            shutdown_tx,
            shutdown_rx,
            maintenance: None,
        }
    }

    /// Build the service from the store's current contents.
    pub async fn initialize(store: Arc<S>, config: RuntimeConfig) -> Result<Self, GateError> {
        let service = RegistrationService::initialize(store, config.gate.clone()).await?;
        Ok(Self::new(Arc::new(service), config))
    }

    pub fn service(&self) -> Arc<RegistrationService<S>> {
        Arc::clone(&self.service)
    }

    /// Spawn the maintenance task. Calling it twice has no effect.
    pub fn start(&mut self) {
        if self.maintenance.is_some() {
            return;
        }

        let stats = self.service.current_filter_stats();
        info!(
            bits = stats.bits,
            hash_count = stats.hash_count,
            current_items = stats.current_items,
            rebuild_interval_secs = self.config.rebuild_interval.map(|d| d.as_secs()),
            saturation_check_secs = self.config.saturation_check_interval.as_secs(),
            "Starting gate maintenance"
        );

        let task = run_maintenance(
            Arc::clone(&self.service),
            self.config.rebuild_interval,
            self.config.saturation_check_interval,
            self.shutdown_rx.clone(),
        );
        self.maintenance = Some(tokio::spawn(task));
    }

    /// Signal shutdown and wait for the maintenance task to stop.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        if let Some(handle) = self.maintenance.take() {
            if let Err(e) = handle.await {
                error!("Maintenance task ended abnormally: {}", e);
            }
        }

        let metrics = self.service.metrics();
        info!(
            metrics = %serde_json::to_string(&metrics).unwrap_or_default(),
            "Shutdown complete"
        );
    }
}

/// Background loop driving periodic and saturation rebuilds.
async fn run_maintenance<S: UniqueKeyStore + 'static>(
    service: Arc<RegistrationService<S>>,
    rebuild_interval: Option<Duration>,
    saturation_check_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let saturation_check_interval = saturation_check_interval.max(MIN_TICK);
    let mut saturation = interval_at(
        Instant::now() + saturation_check_interval,
        saturation_check_interval,
    );
    saturation.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut periodic = rebuild_interval.map(|period| {
        let period = period.max(MIN_TICK);
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!("Maintenance shutdown signal received");
                break;
            }
            _ = saturation.tick() => {
                match service.rebuild_if_saturated().await {
                    Ok(Some(stats)) => log_rebuilt("saturation", &stats),
                    Ok(None) => {}
                    Err(e) => error!(error = %e, "Saturation rebuild failed, keeping live filter"),
                }
            }
            _ = tick_if_enabled(&mut periodic) => {
                match service.rebuild_from_store().await {
                    Ok(stats) => log_rebuilt("periodic", &stats),
                    Err(e) => error!(error = %e, "Periodic rebuild failed, keeping live filter"),
                }
            }
        }
    }
}

async fn tick_if_enabled(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn log_rebuilt(trigger: &'static str, stats: &FilterConfig) {
    info!(
        trigger,
        stats = %serde_json::to_string(stats).unwrap_or_default(),
        "Filter rebuilt"
    );
}
