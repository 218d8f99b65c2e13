//! Transaction oracle.
//!
//! Answers "is any monitored resource manager mid-transaction on the
//! calling execution context right now?".

use crate::domain::{toggle, ResourceManagerRef, TransactionState};
use crate::error::ManagerError;
use crate::ports::ManagerDirectory;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

/// Queries managers in configured order.
#[derive(Clone)]
pub struct TransactionOracle {
    directory: Arc<dyn ManagerDirectory>,
}

impl TransactionOracle {
    pub fn new(directory: Arc<dyn ManagerDirectory>) -> Self {
        Self { directory }
    }

    /// Check `managers` in order; the first one with an open transaction wins.
    ///
    /// - Returns `Inactive` without querying anything while detection is
    ///   suspended for the caller.
    /// - A manager whose lookup or status query fails counts as inactive;
    ///   the scan continues with the next one.
    pub fn check(&self, managers: &[ResourceManagerRef]) -> TransactionState {
        if toggle::is_suspended() {
            return TransactionState::Inactive;
        }

        for manager in managers {
            match self.status_of(manager) {
                Ok(true) => return TransactionState::Active(manager.clone()),
                Ok(false) => {}
                Err(e) => {
                    debug!(manager = %manager, error = %e, "Manager status unavailable, treating as inactive");
                }
            }
        }

        TransactionState::Inactive
    }

    fn status_of(&self, manager: &ResourceManagerRef) -> Result<bool, ManagerError> {
        // Drivers may panic internally; that is a failed query, not a crash.
        panic::catch_unwind(AssertUnwindSafe(|| -> Result<bool, ManagerError> {
            self.directory.lookup(manager)?.in_transaction()
        }))
        .unwrap_or_else(|_| Err(ManagerError::Driver("status query panicked".to_string())))
    }
}
