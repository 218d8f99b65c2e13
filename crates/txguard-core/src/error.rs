//! Error types for the transaction guard.
//!
//! None of these escape `Dispatcher::dispatch`: manager failures are
//! downgraded to "inactive" by the oracle, and configuration errors surface
//! only when settings are loaded.

use crate::domain::ResourceManagerRef;
use thiserror::Error;

/// Errors raised while querying a resource manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManagerError {
    #[error("Resource manager not found: {0}")]
    NotFound(ResourceManagerRef),

    #[error("Resource manager {manager} unavailable: {reason}")]
    Unavailable {
        manager: ResourceManagerRef,
        reason: String,
    },

    #[error("Driver error: {0}")]
    Driver(String),
}

/// Errors raised while loading guard configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),

    #[error("Invalid log severity: {0}")]
    InvalidSeverity(String),

    #[error("Invalid reporting mode: {0} (expected `collect` or `log`)")]
    InvalidMode(String),

    #[error("Configuration parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
