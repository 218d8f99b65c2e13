//! Ports Layer
//!
//! - `adapter.rs`: the classification contract every event adapter implements
//! - `outbound.rs`: what the guard needs from its environment
//!   (transaction status of resource managers, a log sink)

pub mod adapter;
pub mod outbound;

pub use adapter::{subscription_set, Adapter, AdapterRef, ClassifiedOperation};
pub use outbound::{LogSink, ManagerDirectory, TransactionStatus};
