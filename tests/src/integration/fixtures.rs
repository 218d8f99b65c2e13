//! Shared test fixtures.

use lazy_static::lazy_static;
use parking_lot::Mutex;
use serde_json::json;
use shared_bus::{InMemoryEventBus, RawEvent, Subscription};
use std::sync::Arc;
use txguard_core::adapters::{http_client, rpc_client};
use txguard_core::{
    AdapterRef, ConfigHandle, Dispatcher, GuardConfig, GuardSettings, InMemoryManagerDirectory,
    LogSink, ReportingMode, ResourceManagerRef, RpcClientAdapter, ScopedTransactionManager,
    Severity, TransactionOracle, Violation, ViolationReporter, ViolationStore,
};

lazy_static! {
    /// Serializes tests that read or write the process-wide violation store.
    pub static ref GLOBAL_STORE_LOCK: Mutex<()> = Mutex::new(());
}

/// Log sink that remembers every line it was handed.
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(Severity, Violation)>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<(Severity, Violation)> {
        self.lines.lock().clone()
    }

    pub fn count_at(&self, severity: Severity) -> usize {
        self.lines.lock().iter().filter(|(s, _)| *s == severity).count()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, severity: Severity, violation: &Violation) {
        self.lines.lock().push((severity, violation.clone()));
    }
}

/// A bus with a dispatcher attached, monitoring a single manager `primary`.
pub struct GuardHarness {
    pub bus: Arc<InMemoryEventBus>,
    pub dispatcher: Arc<Dispatcher>,
    pub primary: Arc<ScopedTransactionManager>,
    pub store: ViolationStore,
    pub sink: Arc<RecordingSink>,
    subscription: Option<Subscription>,
}

impl GuardHarness {
    /// Collect mode into a private store, reference RPC adapter only.
    pub fn collecting() -> Self {
        Self::build(ReportingMode::Collect, vec![Arc::new(RpcClientAdapter::new())])
    }

    /// Collect mode with an explicit adapter chain.
    pub fn collecting_with(adapters: Vec<AdapterRef>) -> Self {
        Self::build(ReportingMode::Collect, adapters)
    }

    /// Log mode into a [`RecordingSink`] at `Warn`.
    pub fn logging() -> Self {
        let harness = Self::build(ReportingMode::Log, vec![Arc::new(RpcClientAdapter::new())]);
        harness
            .dispatcher
            .config()
            .update(|settings| settings.logging_severity = Severity::Warn);
        harness
    }

    fn build(mode: ReportingMode, adapters: Vec<AdapterRef>) -> Self {
        txguard_telemetry::init_test_logging();

        let primary = Arc::new(ScopedTransactionManager::new("primary"));
        let directory = InMemoryManagerDirectory::new();
        directory.register("primary", primary.clone());

        let settings = GuardSettings {
            monitored_managers: vec![ResourceManagerRef::from("primary")],
            reporting_mode: mode,
            ..GuardSettings::default()
        };

        let store = ViolationStore::new();
        let sink = Arc::new(RecordingSink::default());
        let reporter = ViolationReporter::new(mode, store.clone(), sink.clone());

        let dispatcher = Arc::new(Dispatcher::new(
            ConfigHandle::new(GuardConfig::new(settings, adapters)),
            TransactionOracle::new(Arc::new(directory)),
            reporter,
        ));

        let bus = Arc::new(InMemoryEventBus::new());
        let subscription = dispatcher.attach(&*bus).ok();

        Self {
            bus,
            dispatcher,
            primary,
            store,
            sink,
            subscription,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Drop the bus subscription, detaching the guard.
    pub fn detach(&mut self) {
        self.subscription = None;
    }
}

/// Outbound RPC start event with top-level service/method.
pub fn rpc_event(service: &str, method: &str) -> RawEvent {
    RawEvent::new(rpc_client::RPC_CLIENT_START)
        .with_metadata("service", service)
        .with_metadata("method", method)
}

/// Outbound RPC start event with the pair nested under `stream`.
pub fn rpc_stream_event(service: &str, method: &str) -> RawEvent {
    RawEvent::new(rpc_client::RPC_CLIENT_START).with_metadata(
        "stream",
        json!({ "service_name": service, "method_name": method }),
    )
}

/// Inbound RPC start event; never a violation.
pub fn rpc_server_event(service: &str, method: &str) -> RawEvent {
    RawEvent::new(rpc_client::RPC_SERVER_START)
        .with_metadata("service", service)
        .with_metadata("method", method)
}

/// Outbound HTTP request start event.
pub fn http_event(method: &str, url: &str) -> RawEvent {
    RawEvent::new(http_client::HTTP_CLIENT_START)
        .with_metadata("method", method)
        .with_metadata("url", url)
}
