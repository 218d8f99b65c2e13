//! gRPC client adapter.
//!
//! Claims the "outgoing RPC started" event and extracts `{service, method}`.
//! The server-side start event is deliberately not subscribed: handling an
//! incoming request is not a violation, only calls made from inside a
//! transaction are.

use crate::config::GuardSettings;
use crate::domain::{render_value, Classification, OperationKind, OperationMetadata};
use crate::ports::Adapter;
use serde_json::Value;
use shared_bus::{EventName, Measurements, Metadata};

/// Event emitted when an outbound RPC starts.
pub const RPC_CLIENT_START: [&str; 4] = ["grpc", "client", "rpc", "start"];

/// Event emitted when an inbound RPC starts. Never claimed.
pub const RPC_SERVER_START: [&str; 4] = ["grpc", "server", "rpc", "start"];

/// Adapter name used in configuration.
pub const NAME: &str = "rpc_client";

/// Reference adapter for outbound RPC calls.
#[derive(Debug, Clone)]
pub struct RpcClientAdapter {
    event: EventName,
}

impl RpcClientAdapter {
    pub fn new() -> Self {
        Self::with_event(RPC_CLIENT_START)
    }

    /// Claim a differently named client-start event.
    pub fn with_event(event: impl Into<EventName>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

impl Default for RpcClientAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Look `key` up at the top level, then under the `stream` object
/// (as `key` or `<key>_name`). Missing values become `Null`.
fn extract(metadata: &Metadata, key: &str) -> Value {
    if let Some(value) = metadata.get(key) {
        return value.clone();
    }

    metadata
        .get("stream")
        .and_then(Value::as_object)
        .and_then(|stream| {
            stream
                .get(key)
                .or_else(|| stream.get(&format!("{key}_name")))
        })
        .cloned()
        .unwrap_or(Value::Null)
}

impl Adapter for RpcClientAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn events(&self) -> Vec<EventName> {
        vec![self.event.clone()]
    }

    fn handle_event(
        &self,
        name: &EventName,
        _measurements: &Measurements,
        metadata: &Metadata,
        _settings: &GuardSettings,
    ) -> Classification {
        if *name != self.event {
            return Classification::NotMine;
        }

        let mut operation = OperationMetadata::new();
        operation.insert("service".to_string(), extract(metadata, "service"));
        operation.insert("method".to_string(), extract(metadata, "method"));

        Classification::classified(OperationKind::RPC_CLIENT_CALL, operation)
    }

    fn format_operation(&self, kind: &OperationKind, metadata: &OperationMetadata) -> String {
        if *kind != OperationKind::RPC_CLIENT_CALL {
            return kind.to_string();
        }

        format!(
            "gRPC client call {}/{}",
            render_value(metadata.get("service")),
            render_value(metadata.get("method"))
        )
    }
}
