//! Violation reporting.
//!
//! Two channels, chosen when the reporter is built:
//!
//! | Mode | Effect |
//! |------|--------|
//! | `Collect` | Append to a [`ViolationStore`]; a harness drains it later |
//! | `Log` | Hand to the [`LogSink`] at the configured severity, if enabled |

use crate::adapters::TracingLogSink;
use crate::config::GuardSettings;
use crate::domain::{ReportingMode, ResourceManagerRef, Violation};
use crate::ports::{ClassifiedOperation, LogSink};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::sync::Arc;

lazy_static! {
    /// Process-wide store, readable from any thread.
    static ref GLOBAL_STORE: ViolationStore = ViolationStore::new();
}

/// Ordered, shared collection of detected violations.
///
/// Cloning yields another handle to the same collection. Order is
/// detection order within one thread; appends from different threads
/// interleave in lock order.
#[derive(Debug, Clone, Default)]
pub struct ViolationStore {
    inner: Arc<Mutex<Vec<Violation>>>,
}

impl ViolationStore {
    /// A fresh, private store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the process-wide store.
    pub fn global() -> Self {
        GLOBAL_STORE.clone()
    }

    pub fn push(&self, violation: Violation) {
        self.inner.lock().push(violation);
    }

    /// Take every stored violation, leaving the store empty.
    #[must_use]
    pub fn drain(&self) -> Vec<Violation> {
        std::mem::take(&mut *self.inner.lock())
    }

    /// Copy of the stored violations; the store is left untouched.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Violation> {
        self.inner.lock().clone()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Turns detections into stored records or log lines.
#[derive(Clone)]
pub struct ViolationReporter {
    mode: ReportingMode,
    store: ViolationStore,
    sink: Arc<dyn LogSink>,
}

impl ViolationReporter {
    pub fn new(mode: ReportingMode, store: ViolationStore, sink: Arc<dyn LogSink>) -> Self {
        Self { mode, store, sink }
    }

    /// Reporter appending to `store`.
    pub fn collecting(store: ViolationStore) -> Self {
        Self::new(ReportingMode::Collect, store, Arc::new(TracingLogSink))
    }

    /// Reporter writing to `sink`.
    pub fn logging(sink: Arc<dyn LogSink>) -> Self {
        Self::new(ReportingMode::Log, ViolationStore::global(), sink)
    }

    #[must_use]
    pub fn mode(&self) -> ReportingMode {
        self.mode
    }

    #[must_use]
    pub fn store(&self) -> &ViolationStore {
        &self.store
    }

    /// Render the violation for `operation` inside `manager`'s transaction.
    #[must_use]
    pub fn build(operation: &ClassifiedOperation, manager: &ResourceManagerRef) -> Violation {
        Violation::new(
            &operation.describe(),
            operation.kind.clone(),
            &operation.metadata,
            manager.clone(),
            operation.source_adapter.name(),
        )
    }

    /// Deliver through the configured channel.
    pub fn report(&self, violation: Violation, settings: &GuardSettings) {
        match self.mode {
            ReportingMode::Collect => self.store.push(violation),
            ReportingMode::Log => {
                if settings.logging_enabled {
                    self.sink.log(settings.logging_severity, &violation);
                }
            }
        }
    }
}
