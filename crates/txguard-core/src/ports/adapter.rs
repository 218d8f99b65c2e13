//! Adapter contract.
//!
//! An adapter declares which raw events it wants and turns them into a
//! normalized operation. Adapters are stateless and side-effect free; the
//! dispatcher treats the configured list as a priority chain.

use crate::config::GuardSettings;
use crate::domain::{Classification, OperationKind, OperationMetadata};
use shared_bus::{EventName, Measurements, Metadata};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Classifies raw events into operations.
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Stable name, used in configuration and violation records.
    fn name(&self) -> &str;

    /// Event names this adapter wants delivered.
    fn events(&self) -> Vec<EventName>;

    /// Classify an event.
    ///
    /// Must not block or panic. Anything unrecognized, including names
    /// outside [`Adapter::events`], is [`Classification::NotMine`].
    fn handle_event(
        &self,
        name: &EventName,
        measurements: &Measurements,
        metadata: &Metadata,
        settings: &GuardSettings,
    ) -> Classification;

    /// Describe a classified operation for a violation message.
    ///
    /// Unknown kinds fall back to the kind itself.
    fn format_operation(&self, kind: &OperationKind, _metadata: &OperationMetadata) -> String {
        kind.to_string()
    }
}

/// Shared handle to an adapter.
pub type AdapterRef = Arc<dyn Adapter>;

/// An event an adapter claimed.
#[derive(Debug, Clone)]
pub struct ClassifiedOperation {
    pub kind: OperationKind,
    pub metadata: OperationMetadata,
    pub source_adapter: AdapterRef,
}

impl ClassifiedOperation {
    /// Human-readable description, rendered by the source adapter.
    #[must_use]
    pub fn describe(&self) -> String {
        self.source_adapter.format_operation(&self.kind, &self.metadata)
    }
}

/// Union of the event names declared by `adapters`, duplicates removed.
#[must_use]
pub fn subscription_set(adapters: &[AdapterRef]) -> BTreeSet<EventName> {
    adapters.iter().flat_map(|adapter| adapter.events()).collect()
}
