//! Structured logging setup.
//!
//! Builds a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human-readable or a JSON formatting layer. JSON lines carry consistent
//! fields for log shippers:
//! - `timestamp`: ISO 8601 timestamp
//! - `level`: Log level (trace, debug, info, warn, error)
//! - `target`: Emitting module (`txguard_core::service::reporter`, ...)
//! - `fields`: Structured context (`kind`, `manager`, `adapter` for violations)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::{TelemetryConfig, TelemetryError};

/// Handle returned by [`init_logging`]; hold it for the process lifetime.
pub struct LoggingGuard {
    service_name: String,
}

impl LoggingGuard {
    /// Service name the subscriber was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

/// Build the filter, honouring `RUST_LOG` before the configured directive.
pub(crate) fn build_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| TelemetryError::Filter(e.to_string()))
}

/// Install the global tracing subscriber.
///
/// Fails with [`TelemetryError::AlreadyInitialized`] if a global subscriber
/// is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let env_filter = build_filter(config)?;

    let fmt_layer: Option<Box<dyn Layer<Registry> + Send + Sync>> = if !config.console_output {
        None
    } else if config.json_logs {
        // JSON output for containers/production
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    } else {
        // Pretty output for development
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(!config.is_test_environment())
                .boxed(),
        )
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        json_logs = config.json_logs,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        service_name: config.service_name.clone(),
    })
}

/// Install a test writer subscriber, ignoring "already set" errors.
///
/// Safe to call from every test.
pub fn init_test_logging() {
    let config = TelemetryConfig::for_tests();
    let Ok(env_filter) = build_filter(&config) else {
        return;
    };

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(env_filter)
        .try_init();
}
