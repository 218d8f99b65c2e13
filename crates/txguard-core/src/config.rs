//! Guard configuration.
//!
//! All settings are process-wide and read at use time: the dispatcher
//! loads a snapshot from [`ConfigHandle`] on every event, so updates apply
//! to the next dispatch without a restart.

use crate::adapters::{rpc_client, AdapterCatalog, RpcClientAdapter};
use crate::domain::{ReportingMode, ResourceManagerRef, Severity};
use crate::error::ConfigError;
use crate::ports::AdapterRef;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Serializable guard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// Master switch. When false, every dispatch is a no-op.
    pub detection_enabled: bool,

    /// Managers queried, in order, for an open transaction.
    pub monitored_managers: Vec<ResourceManagerRef>,

    /// Adapter names, in priority order.
    pub adapters: Vec<String>,

    /// Whether log-mode violations are written at all.
    pub logging_enabled: bool,

    /// Severity for log-mode violations.
    pub logging_severity: Severity,

    /// Reporting channel used when the guard is built from settings.
    pub reporting_mode: ReportingMode,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            detection_enabled: true,
            monitored_managers: Vec::new(),
            adapters: vec![rpc_client::NAME.to_string()],
            logging_enabled: true,
            logging_severity: Severity::Error,
            reporting_mode: ReportingMode::Log,
        }
    }
}

impl GuardSettings {
    /// Create settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TXGUARD_ENABLED`: Detection switch (default: true)
    /// - `TXGUARD_MANAGERS`: Comma-separated manager names (default: none)
    /// - `TXGUARD_ADAPTERS`: Comma-separated adapter names (default: rpc_client)
    /// - `TXGUARD_LOG_ENABLED`: Log violations (default: true)
    /// - `TXGUARD_LOG_LEVEL`: Violation severity (default: error)
    /// - `TXGUARD_MODE`: `collect` or `log` (default: log)
    ///
    /// Invalid values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GuardSettings::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            detection_enabled: flag_or_default(
                "TXGUARD_ENABLED",
                lookup("TXGUARD_ENABLED"),
                defaults.detection_enabled,
            ),

            monitored_managers: lookup("TXGUARD_MANAGERS")
                .map(|v| split_list(&v).into_iter().map(ResourceManagerRef::from).collect())
                .unwrap_or(defaults.monitored_managers),

            adapters: lookup("TXGUARD_ADAPTERS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.adapters),

            logging_enabled: flag_or_default(
                "TXGUARD_LOG_ENABLED",
                lookup("TXGUARD_LOG_ENABLED"),
                defaults.logging_enabled,
            ),

            logging_severity: parse_or_default(
                "TXGUARD_LOG_LEVEL",
                lookup("TXGUARD_LOG_LEVEL"),
                defaults.logging_severity,
            ),

            reporting_mode: parse_or_default(
                "TXGUARD_MODE",
                lookup("TXGUARD_MODE"),
                defaults.reporting_mode,
            ),
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// `1/true/yes/on` or `0/false/no/off`, case-insensitive.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag_or_default(key: &str, value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };

    parse_flag(&value).unwrap_or_else(|| {
        warn!(key, value = %value, "Invalid boolean value, using default");
        default
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or_default<T>(key: &str, value: Option<String>, default: T) -> T
where
    T: FromStr<Err = ConfigError>,
{
    let Some(value) = value else {
        return default;
    };

    value.parse().unwrap_or_else(|e: ConfigError| {
        warn!(key, error = %e, "Invalid configuration value, using default");
        default
    })
}

/// Settings plus the adapter handles they name.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub settings: GuardSettings,
    pub adapters: Vec<AdapterRef>,
}

impl GuardConfig {
    /// Pair settings with explicit adapters.
    pub fn new(settings: GuardSettings, adapters: Vec<AdapterRef>) -> Self {
        Self { settings, adapters }
    }

    /// Resolve the adapters named by `settings` through `catalog`.
    pub fn resolve(settings: GuardSettings, catalog: &AdapterCatalog) -> Result<Self, ConfigError> {
        let adapters = catalog.resolve(&settings.adapters)?;
        Ok(Self { settings, adapters })
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            settings: GuardSettings::default(),
            adapters: vec![Arc::new(RpcClientAdapter::new())],
        }
    }
}

/// Shared, hot-reloadable configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<GuardConfig>>>,
}

impl ConfigHandle {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<GuardConfig> {
        self.inner.read().clone()
    }

    /// Replace the whole configuration.
    pub fn store(&self, config: GuardConfig) {
        *self.inner.write() = Arc::new(config);
    }

    /// Edit the settings in place, keeping the current adapters.
    pub fn update(&self, edit: impl FnOnce(&mut GuardSettings)) {
        let mut guard = self.inner.write();
        let mut next = GuardConfig::clone(&guard);
        edit(&mut next.settings);
        *guard = Arc::new(next);
    }

    /// Replace the adapter chain, keeping the current settings.
    pub fn set_adapters(&self, adapters: Vec<AdapterRef>) {
        let mut guard = self.inner.write();
        let mut next = GuardConfig::clone(&guard);
        next.adapters = adapters;
        *guard = Arc::new(next);
    }
}
