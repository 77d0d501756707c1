//! # BlindMint Telemetry
//!
//! Structured logging set-up shared by every binary and test harness that
//! drives the protocol core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blindmint_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `BM_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `BM_SERVICE_NAME` | `blindmint` | Service name on every line |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Global subscriber already set: {0}")]
    AlreadyInitialized(String),
}
