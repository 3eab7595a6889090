//! # Gate Telemetry
//!
//! Logging setup for the membership gate runtime. Library crates only emit
//! `tracing` events; the binary calls [`init_telemetry`] once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `membership-gate` | Service name in log lines |
//! | `GATE_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` also honoured) |
//! | `GATE_JSON_LOGS` | `false` (`true` in containers) | JSON line output |
//! | `GATE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}
