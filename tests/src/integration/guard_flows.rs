//! # Detection Flows
//!
//! Instrumented code publishes on the bus; the attached guard decides.
//!
//! 1. **RPC inside a transaction**: exactly one violation naming service and method
//! 2. **RPC outside a transaction**: nothing stored, nothing logged
//! 3. **Back-to-back calls**: one violation each, in detection order
//! 4. **Adapter precedence**: the first adapter claiming an event wins
//! 5. **Faulty adapters**: a panicking adapter drops one event, not the guard
//! 6. **Suspension**: `run_disabled` silences detection, also across panics
//! 7. **Env-driven wiring**: settings → catalog → dispatcher → global store

#[cfg(test)]
mod tests {
    use super::super::fixtures::{
        http_event, rpc_event, rpc_server_event, rpc_stream_event, GuardHarness,
        GLOBAL_STORE_LOCK,
    };
    use shared_bus::{EventName, EventPublisher, Measurements, Metadata};
    use std::collections::HashMap;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use txguard_core::adapters::rpc_client;
    use txguard_core::{
        drain_violations, is_suspended, run_disabled, Adapter, AdapterCatalog, AdapterRef,
        Classification, DispatchOutcome, Dispatcher, GuardSettings, HttpClientAdapter,
        InMemoryManagerDirectory, OperationKind, OperationMetadata, ResourceManagerRef,
        RpcClientAdapter, ScopedTransactionManager, Severity,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Adapter that claims the RPC client event and counts invocations.
    #[derive(Debug)]
    struct SpyAdapter {
        label: &'static str,
        calls: AtomicUsize,
    }

    impl SpyAdapter {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Adapter for SpyAdapter {
        fn name(&self) -> &str {
            self.label
        }

        fn events(&self) -> Vec<EventName> {
            vec![EventName::from(rpc_client::RPC_CLIENT_START)]
        }

        fn handle_event(
            &self,
            _: &EventName,
            _: &Measurements,
            _: &Metadata,
            _: &GuardSettings,
        ) -> Classification {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Classification::classified(OperationKind::new(self.label), OperationMetadata::new())
        }
    }

    /// RPC adapter that panics when the call carries a `boom` method.
    #[derive(Debug)]
    struct FragileAdapter;

    impl Adapter for FragileAdapter {
        fn name(&self) -> &str {
            "fragile"
        }

        fn events(&self) -> Vec<EventName> {
            vec![EventName::from(rpc_client::RPC_CLIENT_START)]
        }

        fn handle_event(
            &self,
            _: &EventName,
            _: &Measurements,
            metadata: &Metadata,
            _: &GuardSettings,
        ) -> Classification {
            if metadata.get("method").and_then(|m| m.as_str()) == Some("boom") {
                panic!("unexpected payload");
            }
            Classification::NotMine
        }
    }

    // =========================================================================
    // CONCRETE SCENARIOS
    // =========================================================================

    #[test]
    fn test_rpc_call_inside_transaction_is_reported() {
        let guard = GuardHarness::collecting();

        let invoked = guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));

        assert_eq!(invoked, 1);
        let violations = guard.store.drain();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Users"));
        assert!(violations[0].message.contains("GetUser"));
        assert!(violations[0].message.contains("inside a transaction on primary"));
        assert_eq!(violations[0].kind, OperationKind::RPC_CLIENT_CALL);
        assert_eq!(violations[0].adapter, "rpc_client");
    }

    #[test]
    fn test_rpc_call_outside_transaction_collects_nothing() {
        let guard = GuardHarness::collecting();

        guard.bus.publish(rpc_event("Users", "GetUser"));

        assert!(guard.store.is_empty());
    }

    #[test]
    fn test_rpc_call_outside_transaction_logs_nothing() {
        let guard = GuardHarness::logging();

        guard.bus.publish(rpc_event("Users", "GetUser"));

        assert_eq!(guard.sink.count_at(Severity::Warn), 0);
        assert!(guard.sink.lines().is_empty());
        assert!(guard.store.is_empty());
    }

    #[test]
    fn test_log_mode_writes_at_configured_severity() {
        let guard = GuardHarness::logging();

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Billing", "Charge")));

        let lines = guard.sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Severity::Warn);
        assert!(lines[0].1.message.contains("Billing/Charge"));
        assert!(guard.store.is_empty());
    }

    #[test]
    fn test_log_mode_disabled_logging_is_silent() {
        let guard = GuardHarness::logging();
        guard
            .dispatcher
            .config()
            .update(|settings| settings.logging_enabled = false);

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Billing", "Charge")));

        assert!(guard.sink.lines().is_empty());
    }

    #[test]
    fn test_back_to_back_calls_keep_detection_order() {
        let guard = GuardHarness::collecting();

        guard.primary.transaction(|| {
            guard.bus.publish(rpc_event("Users", "GetUser"));
            guard.bus.publish(rpc_event("Orders", "ListOrders"));
        });

        let violations = guard.store.drain();
        assert_eq!(violations.len(), 2);
        assert!(violations[0].message.contains("Users/GetUser"));
        assert!(violations[1].message.contains("Orders/ListOrders"));
        assert!(violations[0].detected_at <= violations[1].detected_at);
    }

    #[test]
    fn test_stream_metadata_is_understood() {
        let guard = GuardHarness::collecting();

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_stream_event("Search", "Query")));

        let violations = guard.store.drain();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Search/Query"));
    }

    #[test]
    fn test_server_side_rpc_is_not_a_violation() {
        let guard = GuardHarness::collecting();

        let invoked = guard
            .primary
            .transaction(|| guard.bus.publish(rpc_server_event("Users", "GetUser")));

        assert_eq!(invoked, 0);
        assert!(guard.store.is_empty());
    }

    #[test]
    fn test_http_adapter_through_bus() {
        let adapters: Vec<AdapterRef> = vec![
            Arc::new(RpcClientAdapter::new()),
            Arc::new(HttpClientAdapter::new()),
        ];
        let guard = GuardHarness::collecting_with(adapters);

        guard.primary.transaction(|| {
            guard
                .bus
                .publish(http_event("post", "https://payments.internal/v1/charges"));
        });

        let violations = guard.store.drain();
        assert_eq!(violations.len(), 1);
        assert!(violations[0]
            .message
            .contains("HTTP POST request to payments.internal/v1/charges"));
        assert_eq!(violations[0].adapter, "http_client");
    }

    #[test]
    fn test_nested_transaction_scopes() {
        let guard = GuardHarness::collecting();

        guard.primary.transaction(|| {
            guard.primary.transaction(|| {
                guard.bus.publish(rpc_event("Users", "GetUser"));
            });
            // Outer scope still open.
            guard.bus.publish(rpc_event("Users", "UpdateUser"));
        });
        guard.bus.publish(rpc_event("Users", "DeleteUser"));

        let messages: Vec<_> = guard.store.drain().into_iter().map(|v| v.message).collect();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("GetUser"));
        assert!(messages[1].contains("UpdateUser"));
    }

    // =========================================================================
    // ADAPTER PRECEDENCE
    // =========================================================================

    #[test]
    fn test_first_adapter_wins_second_never_invoked() {
        let first = SpyAdapter::new("first");
        let second = SpyAdapter::new("second");
        let guard = GuardHarness::collecting_with(vec![first.clone(), second.clone()]);

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));

        let violations = guard.store.drain();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].adapter, "first");
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_adapter_panic_keeps_guard_attached() {
        let adapters: Vec<AdapterRef> = vec![
            Arc::new(FragileAdapter),
            Arc::new(RpcClientAdapter::new()),
        ];
        let guard = GuardHarness::collecting_with(adapters);

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "boom")));
        assert_eq!(guard.bus.handler_count(), 1);
        assert!(guard.store.is_empty());

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));

        let violations = guard.store.drain();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Users/GetUser"));
        assert_eq!(violations[0].adapter, "rpc_client");
    }

    #[test]
    fn test_empty_adapter_chain_is_inert() {
        let guard = GuardHarness::collecting_with(Vec::new());

        assert!(!guard.is_attached());
        assert_eq!(
            guard.primary.transaction(|| {
                let event = rpc_event("Users", "GetUser");
                guard
                    .dispatcher
                    .dispatch_configured(&event.name, &event.measurements, &event.metadata)
            }),
            DispatchOutcome::Unclassified
        );
    }

    // =========================================================================
    // SUSPENSION
    // =========================================================================

    #[test]
    fn test_run_disabled_suppresses_inside_transaction() {
        let guard = GuardHarness::collecting();

        guard.primary.transaction(|| {
            run_disabled(|| guard.bus.publish(rpc_event("Users", "GetUser")));
        });

        assert!(guard.store.is_empty());
    }

    #[test]
    fn test_run_disabled_cleared_after_panic() {
        let guard = GuardHarness::collecting();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            run_disabled(|| panic!("reviewed call failed"))
        }));

        assert!(result.is_err());
        assert!(!is_suspended());

        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));
        assert_eq!(guard.store.len(), 1);
    }

    #[test]
    fn test_hot_reload_disables_detection() {
        let guard = GuardHarness::collecting();

        guard
            .dispatcher
            .config()
            .update(|settings| settings.detection_enabled = false);
        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));
        assert!(guard.store.is_empty());

        guard
            .dispatcher
            .config()
            .update(|settings| settings.detection_enabled = true);
        guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));
        assert_eq!(guard.store.len(), 1);
    }

    #[test]
    fn test_detached_guard_sees_nothing() {
        let mut guard = GuardHarness::collecting();
        guard.detach();

        let invoked = guard
            .primary
            .transaction(|| guard.bus.publish(rpc_event("Users", "GetUser")));

        assert_eq!(invoked, 0);
        assert!(guard.store.is_empty());
    }

    // =========================================================================
    // ENV-DRIVEN WIRING (PROCESS-WIDE STORE)
    // =========================================================================

    #[test]
    fn test_settings_wiring_reports_into_global_store() -> anyhow::Result<()> {
        let _lock = GLOBAL_STORE_LOCK.lock();
        txguard_core::clear_violations();

        let env: HashMap<&str, &str> = HashMap::from([
            ("TXGUARD_MANAGERS", "replica,primary"),
            ("TXGUARD_ADAPTERS", "http_client,rpc_client"),
            ("TXGUARD_MODE", "collect"),
        ]);
        let settings = GuardSettings::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        let primary = Arc::new(ScopedTransactionManager::new("primary"));
        let replica = Arc::new(ScopedTransactionManager::new("replica"));
        let directory = InMemoryManagerDirectory::new();
        directory.register("primary", primary.clone());
        directory.register("replica", replica.clone());

        let dispatcher = Arc::new(Dispatcher::from_settings(
            settings,
            &AdapterCatalog::builtin(),
            Arc::new(directory),
        )?);
        let bus = shared_bus::InMemoryEventBus::new();
        let _subscription = dispatcher.attach(&bus)?;

        primary.transaction(|| {
            bus.publish(http_event("GET", "https://inventory.internal/items/42"));
            bus.publish(rpc_event("Users", "GetUser"));
        });
        bus.publish(rpc_event("Users", "ListUsers"));

        // Reader on another thread sees the same collection.
        let violations = std::thread::spawn(drain_violations)
            .join()
            .map_err(|_| anyhow::anyhow!("reader thread panicked"))?;

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].adapter, "http_client");
        assert_eq!(violations[0].manager, ResourceManagerRef::from("primary"));
        assert_eq!(violations[1].adapter, "rpc_client");
        assert!(drain_violations().is_empty());
        Ok(())
    }

    #[test]
    fn test_drain_twice_is_empty_the_second_time() {
        let _lock = GLOBAL_STORE_LOCK.lock();
        txguard_core::clear_violations();

        let dispatcher = Dispatcher::from_settings(
            GuardSettings {
                monitored_managers: vec![ResourceManagerRef::from("primary")],
                reporting_mode: txguard_core::ReportingMode::Collect,
                ..GuardSettings::default()
            },
            &AdapterCatalog::builtin(),
            {
                let directory = InMemoryManagerDirectory::new();
                directory.register("primary", Arc::new(AlwaysActive));
                Arc::new(directory)
            },
        )
        .expect("dispatcher");

        let event = rpc_event("Users", "GetUser");
        dispatcher.dispatch_event(&event);

        assert_eq!(drain_violations().len(), 1);
        assert!(drain_violations().is_empty());
    }

    /// Manager that always reports an open transaction.
    struct AlwaysActive;

    impl txguard_core::TransactionStatus for AlwaysActive {
        fn in_transaction(&self) -> Result<bool, txguard_core::ManagerError> {
            Ok(true)
        }
    }
}
