//! # Runtime Configuration
//!
//! Gate sizing and background task settings, loaded from environment
//! variables with defaults.

use std::time::Duration;

use membership_gate::{GateConfig, GateConfigBuilder, GateError};
use tracing::warn;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Sizing settings for the membership gate.
    pub gate: GateConfig,
    /// Period of the unconditional rebuild; `None` disables it.
    pub rebuild_interval: Option<Duration>,
    /// Period of the saturation check.
    pub saturation_check_interval: Duration,
    /// Seed the sample users when the store starts empty.
    pub seed_sample_users: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gate: GateConfig::default(),
            rebuild_interval: Some(Duration::from_secs(300)),
            saturation_check_interval: Duration::from_secs(10),
            seed_sample_users: true,
        }
    }
}

impl RuntimeConfig {
    /// Load from environment variables.
    ///
    /// - `GATE_TARGET_FPP` (default 0.01)
    /// - `GATE_MIN_CAPACITY` (default 1000)
    /// - `GATE_CAPACITY_MULTIPLIER` (default 2)
    /// - `GATE_REBUILD_INTERVAL_SECS` (default 300, 0 disables)
    /// - `GATE_SATURATION_CHECK_SECS` (default 10)
    /// - `GATE_SEED_SAMPLE_USERS` (default true)
    pub fn from_env() -> Result<Self, GateError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    ///
    /// Unparseable values are logged and replaced by their default. The
    /// resulting gate settings are validated.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let gate_defaults = &defaults.gate;

        let gate = GateConfigBuilder::new()
            .target_fpp(parse_or(&lookup, "GATE_TARGET_FPP", gate_defaults.target_fpp))
            .minimum_capacity(parse_or(
                &lookup,
                "GATE_MIN_CAPACITY",
                gate_defaults.minimum_capacity,
            ))
            .capacity_multiplier(parse_or(
                &lookup,
                "GATE_CAPACITY_MULTIPLIER",
                gate_defaults.capacity_multiplier,
            ))
            .build()?;

        let rebuild_secs: u64 = parse_or(&lookup, "GATE_REBUILD_INTERVAL_SECS", 300);
        let saturation_secs: u64 = parse_or(&lookup, "GATE_SATURATION_CHECK_SECS", 10);

        Ok(Self {
            gate,
            rebuild_interval: (rebuild_secs > 0).then(|| Duration::from_secs(rebuild_secs)),
            saturation_check_interval: Duration::from_secs(saturation_secs.max(1)),
            seed_sample_users: gate_telemetry::parse_flag(
                lookup("GATE_SEED_SAMPLE_USERS").as_deref(),
                defaults.seed_sample_users,
            ),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(variable = name, value = %raw, default = %default, "Ignoring unparseable value");
            default
        }),
        None => default,
    }
}
