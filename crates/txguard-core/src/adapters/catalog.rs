//! Named adapter registry.
//!
//! Configuration refers to adapters by name; the catalog turns those names
//! into handles, preserving the configured order.

use super::{http_client, rpc_client, HttpClientAdapter, RpcClientAdapter};
use crate::error::ConfigError;
use crate::ports::AdapterRef;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of adapters available to configuration.
#[derive(Debug, Clone, Default)]
pub struct AdapterCatalog {
    entries: BTreeMap<String, AdapterRef>,
}

impl AdapterCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in adapters.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Arc::new(RpcClientAdapter::new()));
        catalog.register(Arc::new(HttpClientAdapter::new()));
        catalog
    }

    /// Register an adapter under its own name, replacing any previous entry.
    pub fn register(&mut self, adapter: AdapterRef) {
        let name = adapter.name().to_string();
        if self.entries.insert(name.clone(), adapter).is_some() {
            debug!(adapter = %name, "Adapter replaced in catalog");
        }
    }

    pub fn get(&self, name: &str) -> Option<AdapterRef> {
        self.entries.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Resolve configured names in order.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<AdapterRef>, ConfigError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| ConfigError::UnknownAdapter(name.clone()))
            })
            .collect()
    }
}

/// Names of the built-in adapters.
pub const BUILTIN: [&str; 2] = [rpc_client::NAME, http_client::NAME];
