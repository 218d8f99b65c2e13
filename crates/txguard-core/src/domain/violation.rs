//! Violations and the policy values that govern how they surface.

use super::operation::{OperationKind, OperationMetadata};
use super::transaction::ResourceManagerRef;
use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An external operation detected inside an open transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Fully rendered, human-readable description.
    pub message: String,
    /// Kind of the offending operation.
    pub kind: OperationKind,
    /// Manager whose transaction was open.
    pub manager: ResourceManagerRef,
    /// Adapter that classified the event.
    pub adapter: String,
    /// Detection time.
    pub detected_at: DateTime<Utc>,
}

impl Violation {
    /// Build a violation, rendering its message.
    pub fn new(
        description: &str,
        kind: OperationKind,
        metadata: &OperationMetadata,
        manager: ResourceManagerRef,
        adapter: impl Into<String>,
    ) -> Self {
        Self {
            message: render_message(description, &manager, metadata),
            kind,
            manager,
            adapter: adapter.into(),
            detected_at: Utc::now(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn render_message(
    description: &str,
    manager: &ResourceManagerRef,
    metadata: &OperationMetadata,
) -> String {
    let metadata = serde_json::to_string(metadata).unwrap_or_else(|_| format!("{metadata:?}"));
    format!(
        "{description} was called inside a transaction on {manager}. \
         External operations inside a transaction can exhaust the connection pool \
         or deadlock. Metadata: {metadata}"
    )
}

/// Severity used when violations are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Error,
}

impl Severity {
    /// The matching `tracing` level.
    #[must_use]
    pub fn as_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidSeverity(s.to_string())),
        }
    }
}

/// How detected violations become visible.
///
/// Chosen by whoever builds the reporter; never inferred inside the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingMode {
    /// Append to a shared store for a harness to drain later.
    Collect,
    /// Write to the log sink and discard.
    #[default]
    Log,
}

impl FromStr for ReportingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collect" => Ok(Self::Collect),
            "log" => Ok(Self::Log),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}
