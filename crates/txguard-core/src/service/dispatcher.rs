//! Event dispatcher.
//!
//! Runs one raw event through classification, the transaction check and
//! reporting:
//!
//! ```text
//! [event] ──disabled?──→ Disabled
//!    │
//!    └─ classify (first adapter wins) ──none──→ Unclassified
//!          │
//!          └─ oracle ──inactive──→ NoTransaction
//!                │
//!                └─ report ──→ Reported
//! ```
//!
//! Every path ends normally; nothing on the dispatch path returns an error
//! or panics on behalf of the guard. A panic raised by an adapter or the log
//! sink is caught and ends that dispatch as `Faulted`, so the guard stays
//! attached to the bus. Each dispatch is independent and only
//! reads shared configuration, so the dispatcher is safe to call from many
//! threads at once.

use crate::adapters::{AdapterCatalog, TracingLogSink};
use crate::config::{ConfigHandle, GuardConfig, GuardSettings};
use crate::domain::{Classification, TransactionState};
use crate::error::ConfigError;
use crate::ports::{subscription_set, AdapterRef, ClassifiedOperation, ManagerDirectory};
use crate::service::oracle::TransactionOracle;
use crate::service::reporter::{ViolationReporter, ViolationStore};
use shared_bus::{
    EventHandler, EventName, EventSubscriber, Measurements, Metadata, RawEvent, Subscription,
    SubscriptionError,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{trace, warn};
use txguard_telemetry::guard_span;

/// Handler id used when attaching to the bus.
pub const HANDLER_ID: &str = "txguard";

/// How a single dispatch ended. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Detection is switched off.
    Disabled,
    /// No adapter claimed the event.
    Unclassified,
    /// Classified, but no monitored transaction was open (or detection
    /// was suspended for the caller).
    NoTransaction,
    /// A violation was handed to the reporter.
    Reported,
    /// An adapter or the log sink panicked; the event was dropped.
    Faulted,
}

/// Offer the event to each adapter in order; the first match wins and
/// later adapters are not consulted.
pub fn classify(
    name: &EventName,
    measurements: &Measurements,
    metadata: &Metadata,
    adapters: &[AdapterRef],
    settings: &GuardSettings,
) -> Option<ClassifiedOperation> {
    adapters.iter().find_map(|adapter| {
        match adapter.handle_event(name, measurements, metadata, settings) {
            Classification::Classified { kind, metadata } => Some(ClassifiedOperation {
                kind,
                metadata,
                source_adapter: adapter.clone(),
            }),
            Classification::NotMine => None,
        }
    })
}

/// Orchestrates adapters, the oracle and the reporter.
#[derive(Clone)]
pub struct Dispatcher {
    config: ConfigHandle,
    oracle: TransactionOracle,
    reporter: ViolationReporter,
}

impl Dispatcher {
    pub fn new(config: ConfigHandle, oracle: TransactionOracle, reporter: ViolationReporter) -> Self {
        Self {
            config,
            oracle,
            reporter,
        }
    }

    /// Build a dispatcher whose reporting channel follows
    /// `settings.reporting_mode`: the process-wide store for `Collect`,
    /// `tracing` for `Log`.
    pub fn from_settings(
        settings: GuardSettings,
        catalog: &AdapterCatalog,
        directory: Arc<dyn ManagerDirectory>,
    ) -> Result<Self, ConfigError> {
        let reporter = ViolationReporter::new(
            settings.reporting_mode,
            ViolationStore::global(),
            Arc::new(TracingLogSink),
        );
        let config = GuardConfig::resolve(settings, catalog)?;

        Ok(Self::new(
            ConfigHandle::new(config),
            TransactionOracle::new(directory),
            reporter,
        ))
    }

    #[must_use]
    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    #[must_use]
    pub fn reporter(&self) -> &ViolationReporter {
        &self.reporter
    }

    /// Dispatch one event against an explicit adapter chain.
    pub fn dispatch(
        &self,
        name: &EventName,
        measurements: &Measurements,
        metadata: &Metadata,
        adapters: &[AdapterRef],
    ) -> DispatchOutcome {
        let config = self.config.load();
        self.run(&config.settings, name, measurements, metadata, adapters)
    }

    /// Dispatch one event against the configured adapter chain.
    pub fn dispatch_configured(
        &self,
        name: &EventName,
        measurements: &Measurements,
        metadata: &Metadata,
    ) -> DispatchOutcome {
        let config = self.config.load();
        self.run(&config.settings, name, measurements, metadata, &config.adapters)
    }

    fn run(
        &self,
        settings: &GuardSettings,
        name: &EventName,
        measurements: &Measurements,
        metadata: &Metadata,
        adapters: &[AdapterRef],
    ) -> DispatchOutcome {
        let _span = guard_span!("dispatch", event = %name).entered();

        if !settings.detection_enabled {
            trace!("Detection disabled");
            return DispatchOutcome::Disabled;
        }

        let classified = panic::catch_unwind(AssertUnwindSafe(|| {
            classify(name, measurements, metadata, adapters, settings)
        }));
        let operation = match classified {
            Ok(Some(operation)) => operation,
            Ok(None) => {
                trace!("No adapter claimed event");
                return DispatchOutcome::Unclassified;
            }
            Err(_) => {
                warn!(event = %name, "Adapter panicked during classification, event dropped");
                return DispatchOutcome::Faulted;
            }
        };

        let TransactionState::Active(manager) = self.oracle.check(&settings.monitored_managers)
        else {
            trace!(kind = %operation.kind, "No open transaction");
            return DispatchOutcome::NoTransaction;
        };

        let reported = panic::catch_unwind(AssertUnwindSafe(|| {
            let violation = ViolationReporter::build(&operation, &manager);
            trace!(kind = %operation.kind, manager = %manager, "Violation detected");
            self.reporter.report(violation, settings);
        }));
        if reported.is_err() {
            warn!(
                kind = %operation.kind,
                adapter = operation.source_adapter.name(),
                "Violation rendering or reporting panicked, event dropped"
            );
            return DispatchOutcome::Faulted;
        }

        DispatchOutcome::Reported
    }

    /// Dispatch a whole event against the configured adapter chain.
    pub fn dispatch_event(&self, event: &RawEvent) -> DispatchOutcome {
        self.dispatch_configured(&event.name, &event.measurements, &event.metadata)
    }

    /// Event names the configured adapters declare.
    #[must_use]
    pub fn subscribed_events(&self) -> Vec<EventName> {
        subscription_set(&self.config.load().adapters)
            .into_iter()
            .collect()
    }

    /// Attach to `bus` for every event the configured adapters declare.
    ///
    /// The subscription set is computed once; re-attach after changing the
    /// adapter chain.
    pub fn attach(
        self: &Arc<Self>,
        bus: &dyn EventSubscriber,
    ) -> Result<Subscription, SubscriptionError> {
        let handler: Arc<dyn EventHandler> = self.clone();
        bus.attach(HANDLER_ID, self.subscribed_events(), handler)
    }
}

impl EventHandler for Dispatcher {
    fn handle_event(&self, name: &EventName, measurements: &Measurements, metadata: &Metadata) {
        self.dispatch_configured(name, measurements, metadata);
    }
}
