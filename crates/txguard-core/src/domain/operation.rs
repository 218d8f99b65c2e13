//! Classified operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Rendering used for metadata values an event did not carry.
pub const ABSENT: &str = "<absent>";

/// Normalized metadata of a classified operation.
///
/// Keys an adapter expects but the event lacks are stored as `Value::Null`.
pub type OperationMetadata = BTreeMap<String, Value>;

/// Symbolic operation kind, e.g. `rpc_client_call`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKind(Cow<'static, str>);

impl OperationKind {
    /// Outbound RPC call.
    pub const RPC_CLIENT_CALL: OperationKind = OperationKind::from_static("rpc_client_call");

    /// Outbound HTTP request.
    pub const HTTP_CLIENT_REQUEST: OperationKind =
        OperationKind::from_static("http_client_request");

    /// Kind backed by a static string.
    #[must_use]
    pub const fn from_static(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    /// Kind backed by an owned string.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(Cow::Owned(kind.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of offering an event to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The adapter recognized the event.
    Classified {
        kind: OperationKind,
        metadata: OperationMetadata,
    },
    /// Not this adapter's event.
    NotMine,
}

impl Classification {
    pub fn classified(kind: OperationKind, metadata: OperationMetadata) -> Self {
        Self::Classified { kind, metadata }
    }

    #[must_use]
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Classified { .. })
    }
}

/// Render a metadata value for a human-readable message.
///
/// Strings are shown bare, `Null` as [`ABSENT`], everything else as JSON.
#[must_use]
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => ABSENT.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
