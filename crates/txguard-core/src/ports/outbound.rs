//! Outbound Ports (Driven Ports)
//!
//! Dependencies the guard needs from its environment. The guard is
//! read-only against resource managers: it only ever asks.

use crate::domain::{ResourceManagerRef, Severity, Violation};
use crate::error::ManagerError;
use std::sync::Arc;

/// Transaction status of one resource manager.
pub trait TransactionStatus: Send + Sync {
    /// True if a transaction is open on the calling execution context.
    fn in_transaction(&self) -> Result<bool, ManagerError>;
}

/// Looks up resource managers by reference at query time.
pub trait ManagerDirectory: Send + Sync {
    /// Resolve a manager. Failure is reported, never cached.
    fn lookup(
        &self,
        manager: &ResourceManagerRef,
    ) -> Result<Arc<dyn TransactionStatus>, ManagerError>;
}

/// Destination for violations in log mode.
///
/// Implementations must not block the emitting thread for long.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, violation: &Violation);
}
