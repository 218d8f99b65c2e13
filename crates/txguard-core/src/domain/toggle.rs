//! Scoped suspension of detection.
//!
//! Suspension is local to the calling execution context: a per-thread depth
//! counter for synchronous code, and a task-local marker for async code
//! (a task may hop threads between polls, so the counter alone is not enough).
//!
//! ```rust,ignore
//! // Deliberate, reviewed call inside a transaction:
//! let user = run_disabled(|| client.get_user(id));
//!
//! // Async variant:
//! let user = run_disabled_async(client.get_user_async(id)).await;
//! ```

use std::cell::Cell;
use std::future::Future;
use std::marker::PhantomData;

thread_local! {
    static SUSPEND_DEPTH: Cell<usize> = const { Cell::new(0) };
}

tokio::task_local! {
    static TASK_SUSPENDED: ();
}

/// RAII guard: detection is suspended on this thread while it lives.
///
/// Nested guards stack; detection resumes when the outermost is dropped,
/// including during unwinding.
#[must_use = "detection resumes as soon as the guard is dropped"]
pub struct DetectionSuspended {
    // Bound to the thread whose counter it incremented.
    _not_send: PhantomData<*const ()>,
}

impl DetectionSuspended {
    pub fn enter() -> Self {
        SUSPEND_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for DetectionSuspended {
    fn drop(&mut self) {
        SUSPEND_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Run `f` with detection suspended on the current thread.
pub fn run_disabled<T>(f: impl FnOnce() -> T) -> T {
    let _guard = DetectionSuspended::enter();
    f()
}

/// Run `fut` with detection suspended for the current task.
pub async fn run_disabled_async<F>(fut: F) -> F::Output
where
    F: Future,
{
    TASK_SUSPENDED.scope((), fut).await
}

/// True if detection is suspended for the calling thread or task.
#[must_use]
pub fn is_suspended() -> bool {
    SUSPEND_DEPTH.with(|depth| depth.get() > 0) || TASK_SUSPENDED.try_with(|_| ()).is_ok()
}
