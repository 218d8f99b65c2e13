//! Resource managers and their transaction state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a monitored resource manager (e.g. a database
/// repository). Supplied by configuration, never discovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManagerRef(String);

impl ResourceManagerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceManagerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceManagerRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ResourceManagerRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Result of one oracle query. Recomputed on every dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    /// No monitored manager has an open transaction.
    Inactive,
    /// The first monitored manager found with an open transaction.
    Active(ResourceManagerRef),
}

impl TransactionState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The active manager, if any.
    #[must_use]
    pub fn manager(&self) -> Option<&ResourceManagerRef> {
        match self {
            Self::Active(manager) => Some(manager),
            Self::Inactive => None,
        }
    }
}
