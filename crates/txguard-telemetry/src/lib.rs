//! # Txn-Guard Telemetry
//!
//! Logging bootstrap for processes that embed the transaction guard.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use txguard_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_logging(&config)?;
//!
//!     // Violations reported in log mode now reach the configured sink
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TXGUARD_SERVICE_NAME` | `txn-guard` | Service name in log lines |
//! | `TXGUARD_LOG_FILTER` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `TXGUARD_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `TXGUARD_JSON_LOGS` | `false` (`true` in containers) | JSON formatted lines |
//! | `TXGUARD_ENV` | `development` | Deployment environment |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Convenience macro for creating a span with guard context.
///
/// # Example
///
/// ```rust,ignore
/// use txguard_telemetry::guard_span;
///
/// let _span = guard_span!("dispatch", event = %name).entered();
/// ```
#[macro_export]
macro_rules! guard_span {
    ($name:expr, $($field:tt)*) => {
        tracing::debug_span!($name, component = "txguard", $($field)*)
    };
}
