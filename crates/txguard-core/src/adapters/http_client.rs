//! HTTP client adapter.
//!
//! Claims the "outgoing HTTP request started" event and extracts
//! `{method, host, path, url}`.

use crate::config::GuardSettings;
use crate::domain::{render_value, Classification, OperationKind, OperationMetadata, ABSENT};
use crate::ports::Adapter;
use serde_json::Value;
use shared_bus::{EventName, Measurements, Metadata};
use url::Url;

/// Event emitted when an outbound HTTP request starts.
pub const HTTP_CLIENT_START: [&str; 4] = ["http", "client", "request", "start"];

/// Adapter name used in configuration.
pub const NAME: &str = "http_client";

/// Adapter for outbound HTTP requests.
#[derive(Debug, Clone, Default)]
pub struct HttpClientAdapter;

impl HttpClientAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Adapter for HttpClientAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn events(&self) -> Vec<EventName> {
        vec![EventName::from(HTTP_CLIENT_START)]
    }

    fn handle_event(
        &self,
        name: &EventName,
        _measurements: &Measurements,
        metadata: &Metadata,
        _settings: &GuardSettings,
    ) -> Classification {
        if *name != EventName::from(HTTP_CLIENT_START) {
            return Classification::NotMine;
        }

        let method = metadata
            .get("method")
            .and_then(Value::as_str)
            .map(|m| Value::from(m.to_uppercase()))
            .unwrap_or(Value::Null);
        let raw_url = metadata.get("url").cloned().unwrap_or(Value::Null);

        let mut operation = OperationMetadata::new();
        operation.insert("method".to_string(), method);
        operation.insert("host".to_string(), Value::Null);
        operation.insert("path".to_string(), Value::Null);

        // Unparsable urls keep the raw string; host and path stay absent.
        if let Some(parsed) = raw_url.as_str().and_then(|u| Url::parse(u).ok()) {
            if let Some(host) = parsed.host_str() {
                operation.insert("host".to_string(), Value::from(host));
            }
            operation.insert("path".to_string(), Value::from(parsed.path()));
        }
        operation.insert("url".to_string(), raw_url);

        Classification::classified(OperationKind::HTTP_CLIENT_REQUEST, operation)
    }

    fn format_operation(&self, kind: &OperationKind, metadata: &OperationMetadata) -> String {
        if *kind != OperationKind::HTTP_CLIENT_REQUEST {
            return kind.to_string();
        }

        let method = render_value(metadata.get("method"));
        match metadata.get("host").and_then(Value::as_str) {
            Some(host) => format!(
                "HTTP {method} request to {host}{}",
                metadata
                    .get("path")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
            ),
            None if metadata.get("url").is_some_and(|u| !u.is_null()) => {
                format!("HTTP {method} request to {}", render_value(metadata.get("url")))
            }
            None => format!("HTTP {method} request to {ABSENT}"),
        }
    }
}
