//! Resource manager wiring.
//!
//! `InMemoryManagerDirectory` maps configured references to status
//! handles. `ScopedTransactionManager` is a reference manager whose open
//! transactions are tracked per thread, the way a database pool pins a
//! connection to the caller for the duration of a transaction.

use crate::domain::ResourceManagerRef;
use crate::error::ManagerError;
use crate::ports::{ManagerDirectory, TransactionStatus};
use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Directory of resource managers keyed by reference.
#[derive(Default)]
pub struct InMemoryManagerDirectory {
    managers: RwLock<HashMap<ResourceManagerRef, Arc<dyn TransactionStatus>>>,
}

impl InMemoryManagerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a manager.
    pub fn register(
        &self,
        manager: impl Into<ResourceManagerRef>,
        status: Arc<dyn TransactionStatus>,
    ) {
        let manager = manager.into();
        debug!(manager = %manager, "Resource manager registered");
        self.managers.write().insert(manager, status);
    }

    /// Remove a manager. Returns false if it was not registered.
    pub fn unregister(&self, manager: &ResourceManagerRef) -> bool {
        self.managers.write().remove(manager).is_some()
    }

    pub fn len(&self) -> usize {
        self.managers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.read().is_empty()
    }
}

impl ManagerDirectory for InMemoryManagerDirectory {
    fn lookup(
        &self,
        manager: &ResourceManagerRef,
    ) -> Result<Arc<dyn TransactionStatus>, ManagerError> {
        self.managers
            .read()
            .get(manager)
            .cloned()
            .ok_or_else(|| ManagerError::NotFound(manager.clone()))
    }
}

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Open transaction depth per manager id, for the current thread.
    static OPEN_TRANSACTIONS: RefCell<HashMap<u64, usize>> = RefCell::new(HashMap::new());
}

/// Reference manager with per-thread transaction state.
#[derive(Debug)]
pub struct ScopedTransactionManager {
    id: u64,
    name: ResourceManagerRef,
}

impl ScopedTransactionManager {
    pub fn new(name: impl Into<ResourceManagerRef>) -> Self {
        Self {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &ResourceManagerRef {
        &self.name
    }

    /// Open a transaction on the current thread until the scope is dropped.
    ///
    /// Nested scopes behave like savepoints: the transaction stays open
    /// until the outermost scope closes.
    pub fn begin(&self) -> TransactionScope {
        OPEN_TRANSACTIONS.with(|open| *open.borrow_mut().entry(self.id).or_insert(0) += 1);
        TransactionScope {
            manager_id: self.id,
            _not_send: PhantomData,
        }
    }

    /// Run `f` inside a transaction.
    pub fn transaction<T>(&self, f: impl FnOnce() -> T) -> T {
        let _scope = self.begin();
        f()
    }

    /// Open transaction depth on the current thread.
    #[must_use]
    pub fn depth(&self) -> usize {
        OPEN_TRANSACTIONS.with(|open| open.borrow().get(&self.id).copied().unwrap_or(0))
    }
}

impl TransactionStatus for ScopedTransactionManager {
    fn in_transaction(&self) -> Result<bool, ManagerError> {
        Ok(self.depth() > 0)
    }
}

/// An open transaction on one thread. Closes on drop, including unwinding.
#[must_use = "the transaction closes as soon as the scope is dropped"]
pub struct TransactionScope {
    manager_id: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        OPEN_TRANSACTIONS.with(|open| {
            let mut open = open.borrow_mut();
            if let Some(depth) = open.get_mut(&self.manager_id) {
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    open.remove(&self.manager_id);
                }
            }
        });
    }
}
