//! Telemetry configuration from environment variables.

use std::env;
use tracing::warn;

/// Configuration for process logging.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or an EnvFilter string)
    pub log_filter: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment (development, test, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "txn-guard".to_string(),
            log_filter: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TXGUARD_SERVICE_NAME`: Service name (default: txn-guard)
    /// - `TXGUARD_LOG_FILTER` or `RUST_LOG`: Log filter (default: info)
    /// - `TXGUARD_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `TXGUARD_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `TXGUARD_ENV`: Deployment environment (default: development)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("TXGUARD_SERVICE_NAME")
                .unwrap_or_else(|_| "txn-guard".to_string()),

            log_filter: env::var("TXGUARD_LOG_FILTER")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: flag_or_default(
                "TXGUARD_CONSOLE_OUTPUT",
                env::var("TXGUARD_CONSOLE_OUTPUT").ok(),
                true,
            ),

            json_logs: flag_or_default(
                "TXGUARD_JSON_LOGS",
                env::var("TXGUARD_JSON_LOGS").ok(),
                is_container,
            ),

            environment: env::var("TXGUARD_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Configuration suited to test runs: quiet console, plain text.
    pub fn for_tests() -> Self {
        Self {
            log_filter: "warn".to_string(),
            environment: "test".to_string(),
            ..Self::default()
        }
    }

    /// True when running under an automated test harness.
    pub fn is_test_environment(&self) -> bool {
        self.environment == "test"
    }
}

/// Interpret a boolean-ish environment value: `1/true/yes/on` or
/// `0/false/no/off`, case-insensitive. Anything else is `None`.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parsed flag, or `default` (with a warning) when unset or unrecognised.
pub(crate) fn flag_or_default(key: &str, value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };

    parse_flag(&value).unwrap_or_else(|| {
        warn!(key, value = %value, "Invalid boolean value, using default");
        default
    })
}
