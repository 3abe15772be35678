//! # Explicit deferral: run a callback after the current synchronous turn.
//!
//! The bus itself never schedules work ([`emit`](crate::EventBus::emit) is
//! synchronous to completion). A listener that wants part of its reaction to
//! run after the current turn asks the host scheduler explicitly through
//! [`defer_after_current_turn`] — deferral is a capability of the runtime,
//! invoked by the listener, never implicit inside the bus.

use tokio::task::JoinHandle;

/// Schedules `f` to run after the current synchronous turn completes.
///
/// Spawns onto the ambient tokio runtime and yields once before invoking the
/// callback, so every future already scheduled in this turn gets a chance to
/// run first. Returns the join handle for callers that need to await or abort
/// the deferred work.
///
/// ## Panics
/// Panics if called outside a tokio runtime, like any `tokio::spawn`.
///
/// ## Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use coflow::defer_after_current_turn;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fired = Arc::new(AtomicBool::new(false));
///
/// let flag = fired.clone();
/// let deferred = defer_after_current_turn(move || flag.store(true, Ordering::SeqCst));
///
/// assert!(!fired.load(Ordering::SeqCst), "not yet: current turn still running");
/// deferred.await.unwrap();
/// assert!(fired.load(Ordering::SeqCst));
/// # }
/// ```
pub fn defer_after_current_turn<F>(f: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        f();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_deferred_callback_runs_after_current_turn() {
        let order = Arc::new(AtomicUsize::new(0));

        let slot = order.clone();
        let deferred = defer_after_current_turn(move || {
            slot.compare_exchange(1, 2, Ordering::SeqCst, Ordering::SeqCst)
                .expect("deferred work must observe the turn's writes");
        });

        // Still inside the current turn: the callback has not run.
        order.store(1, Ordering::SeqCst);

        deferred.await.expect("deferred task");
        assert_eq!(order.load(Ordering::SeqCst), 2);
    }
}
