//! Adapters Layer
//!
//! - Event adapters (`RpcClientAdapter`, `HttpClientAdapter`) implementing
//!   the classification contract, and the `AdapterCatalog` naming them
//! - `InMemoryManagerDirectory` / `ScopedTransactionManager`: resource
//!   manager wiring
//! - `TracingLogSink`: log-mode destination

pub mod catalog;
pub mod http_client;
pub mod log_sink;
pub mod managers;
pub mod rpc_client;

pub use catalog::AdapterCatalog;
pub use http_client::HttpClientAdapter;
pub use log_sink::TracingLogSink;
pub use managers::{InMemoryManagerDirectory, ScopedTransactionManager, TransactionScope};
pub use rpc_client::RpcClientAdapter;
