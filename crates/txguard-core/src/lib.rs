//! # Txn-Guard Core
//!
//! Flags external operations (outbound RPC, HTTP requests) performed while a
//! database transaction is open. Such calls hold a pooled connection, and
//! often row locks, for as long as the remote side takes to answer.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure types, no I/O
//!   - `Classification`, `OperationKind`: what an adapter recognised
//!   - `TransactionState`, `ResourceManagerRef`: oracle answers
//!   - `Violation`, `Severity`, `ReportingMode`: report records
//!   - `run_disabled` / `DetectionSuspended`: scoped suspension
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `Adapter`: turns raw bus events into classified operations
//!   - `TransactionStatus`, `ManagerDirectory`: driven ports to resource managers
//!   - `LogSink`: log-mode destination
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `Dispatcher`: event handler attached to the bus
//!   - `TransactionOracle`: "is a monitored transaction open here?"
//!   - `ViolationReporter` / `ViolationStore`: collect or log
//!
//! - **Adapters Layer** (`adapters/`): Concrete implementations
//!   - `RpcClientAdapter`, `HttpClientAdapter`, `AdapterCatalog`
//!   - `InMemoryManagerDirectory`, `ScopedTransactionManager`
//!   - `TracingLogSink`
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐  publish   ┌───────────┐  inline   ┌────────────┐
//! │ RPC / HTTP   │ ─────────→ │ Event Bus │ ────────→ │ Dispatcher │
//! │ client       │            └───────────┘           └─────┬──────┘
//! └──────────────┘                                          │
//!        ┌────────────────────────┬─────────────────────────┤
//!        ▼                        ▼                         ▼
//! ┌──────────────┐       ┌─────────────────┐       ┌──────────────────┐
//! │   Adapters   │       │ Transaction     │       │ Violation        │
//! │ (first wins) │       │ Oracle          │       │ Reporter         │
//! └──────────────┘       └─────────────────┘       └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shared_bus::InMemoryEventBus;
//! use std::sync::Arc;
//! use txguard_core::{AdapterCatalog, Dispatcher, GuardSettings, InMemoryManagerDirectory};
//!
//! let directory = Arc::new(InMemoryManagerDirectory::new());
//! directory.register("primary", primary_pool.clone());
//!
//! let dispatcher = Arc::new(Dispatcher::from_settings(
//!     GuardSettings::from_env(),
//!     &AdapterCatalog::builtin(),
//!     directory,
//! )?);
//! dispatcher.attach(&bus)?.persist();
//!
//! // Later, in a test harness running in collect mode:
//! let violations = txguard_core::drain_violations();
//! assert!(violations.is_empty(), "{violations:#?}");
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::{
    AdapterCatalog, HttpClientAdapter, InMemoryManagerDirectory, RpcClientAdapter,
    ScopedTransactionManager, TracingLogSink, TransactionScope,
};
pub use config::{ConfigHandle, GuardConfig, GuardSettings};
pub use domain::{
    is_suspended, run_disabled, run_disabled_async, Classification, DetectionSuspended,
    OperationKind, OperationMetadata, ReportingMode, ResourceManagerRef, Severity,
    TransactionState, Violation,
};
pub use error::{ConfigError, ManagerError};
pub use ports::{Adapter, AdapterRef, ClassifiedOperation, LogSink, ManagerDirectory, TransactionStatus};
pub use service::{
    classify, DispatchOutcome, Dispatcher, TransactionOracle, ViolationReporter, ViolationStore,
    HANDLER_ID,
};

/// Take every violation collected in the process-wide store.
pub fn drain_violations() -> Vec<Violation> {
    ViolationStore::global().drain()
}

/// Empty the process-wide store.
pub fn clear_violations() {
    ViolationStore::global().clear();
}
