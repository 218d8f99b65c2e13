//! # Telemetry Events
//!
//! Defines the raw event shape that flows through the shared bus.
//!
//! An event is identified by an ordered [`EventName`] (e.g.
//! `grpc.client.rpc.start`) and carries two maps: numeric
//! [`Measurements`] and free-form [`Metadata`] that only the consumer
//! knows how to interpret.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Numeric measurements attached to an event (durations, sizes, counts).
pub type Measurements = BTreeMap<String, f64>;

/// Arbitrary key/value metadata attached to an event.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Error returned when parsing an event name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventNameError {
    /// The input contained no segments.
    #[error("Event name must contain at least one segment")]
    Empty,
}

/// Ordered, symbolic event name such as `["grpc", "client", "rpc", "start"]`.
///
/// Displayed and parsed in dotted form (`grpc.client.rpc.start`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(Vec<String>);

impl EventName {
    /// Build a name from its segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The individual segments of this name.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the name has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `prefix` matches the leading segments of this name.
    #[must_use]
    pub fn starts_with(&self, prefix: &EventName) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for EventName {
    type Err = EventNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s
            .split('.')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        if segments.is_empty() {
            return Err(EventNameError::Empty);
        }
        Ok(Self(segments))
    }
}

impl From<&[&str]> for EventName {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for EventName {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

/// A single emitted event.
///
/// Ephemeral: it lives for the duration of one `execute` call, plus
/// whatever copies stream observers keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The event name.
    pub name: EventName,
    /// Numeric measurements.
    pub measurements: Measurements,
    /// Consumer-interpreted metadata.
    pub metadata: Metadata,
}

impl RawEvent {
    /// Create an event with empty measurements and metadata.
    pub fn new(name: impl Into<EventName>) -> Self {
        Self {
            name: name.into(),
            measurements: Measurements::new(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a measurement.
    #[must_use]
    pub fn with_measurement(mut self, key: impl Into<String>, value: f64) -> Self {
        self.measurements.insert(key.into(), value);
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Filter for stream subscriptions.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Exact names to include. Empty (together with `prefixes`) means all.
    pub names: Vec<EventName>,
    /// Name prefixes to include.
    pub prefixes: Vec<EventName>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific event names.
    #[must_use]
    pub fn names(names: Vec<EventName>) -> Self {
        Self {
            names,
            prefixes: Vec::new(),
        }
    }

    /// Create a filter for every event under a name prefix.
    #[must_use]
    pub fn prefix(prefix: impl Into<EventName>) -> Self {
        Self {
            names: Vec::new(),
            prefixes: vec![prefix.into()],
        }
    }

    /// Check if an event name matches this filter.
    #[must_use]
    pub fn matches(&self, name: &EventName) -> bool {
        if self.names.is_empty() && self.prefixes.is_empty() {
            return true;
        }

        self.names.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p))
    }
}
