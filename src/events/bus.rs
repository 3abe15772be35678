//! # Synchronous event bus with registration-ordered delivery.
//!
//! [`EventBus`] maps event names to ordered listener lists. Emission is
//! fully synchronous and blocking relative to the caller: `emit` invokes
//! every current listener in registration order and does not return until
//! each has run to completion (or one has failed).
//!
//! ## Architecture
//! ```text
//! on("tick", L1) ──┐
//! on("tick", L2) ──┼──► listeners["tick"] = [L1, L2, L3]   (registration order)
//! once("tick",L3) ─┘
//!
//! emit("tick", &payload):
//!   snapshot [L1, L2, L3], strip once-entries ──► L1(&p); L2(&p); L3(&p)
//! ```
//!
//! ## Rules
//! - **Registration order**: listeners fire in the order they were added.
//! - **At-most-once for `once`**: once-tagged entries are removed from the
//!   table *before* invocation, so a reentrant emit cannot fire them twice.
//! - **Fail-fast emission**: a listener error returns to the caller as
//!   [`BusError::ListenerFailed`]; remaining listeners in that emission are
//!   skipped.
//! - **Reentrancy**: the listener table lock is never held while callbacks
//!   run, so a listener may call `emit`, `on`, or `off` on the same bus.
//! - **No deferral**: the bus never schedules work; a listener that wants to
//!   run after the current turn calls
//!   [`defer_after_current_turn`](crate::defer_after_current_turn) itself.
//!
//! ## The `"error"` event
//! Emitting [`ERROR_EVENT`] with zero registered listeners raises
//! [`BusError::UnhandledError`]; every other unlistened name returns
//! `Ok(false)` and raises nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use crate::error::BusError;

/// Reserved event name with escalation semantics (see module docs).
pub const ERROR_EVENT: &str = "error";

/// Identifier returned by [`EventBus::on`]/[`EventBus::once`], used to remove
/// a specific registration via [`EventBus::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Advisory configuration for the bus.
///
/// ## Field semantics
/// - `listener_warn_threshold`: caller-visible threshold for
///   [`EventBus::exceeds_warn_threshold`]. Purely advisory; the bus never
///   enforces an upper bound on registrations.
#[derive(Clone, Copy, Debug)]
pub struct BusConfig {
    /// Per-event listener count above which
    /// [`EventBus::exceeds_warn_threshold`] reports `true`.
    pub listener_warn_threshold: usize,
}

impl Default for BusConfig {
    /// Returns a config with `listener_warn_threshold = 10`.
    fn default() -> Self {
        Self {
            listener_warn_threshold: 10,
        }
    }
}

type ListenerFn<T> = dyn Fn(&T) -> Result<(), String> + Send + Sync;

struct ListenerEntry<T> {
    id: SubscriptionId,
    callback: Arc<ListenerFn<T>>,
    once: bool,
}

/// Registration-ordered synchronous publish/subscribe registry.
///
/// ## Example
/// ```
/// use coflow::EventBus;
///
/// let bus: EventBus<u32> = EventBus::new();
/// let hits = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
///
/// let seen = hits.clone();
/// bus.on("tick", move |n: &u32| {
///     seen.fetch_add(*n, std::sync::atomic::Ordering::SeqCst);
///     Ok(())
/// });
///
/// assert_eq!(bus.emit("tick", &2).unwrap(), true);
/// assert_eq!(bus.emit("idle", &2).unwrap(), false); // unlistened, not "error"
/// assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 2);
/// ```
pub struct EventBus<T> {
    listeners: Mutex<HashMap<String, Vec<ListenerEntry<T>>>>,
    next_id: AtomicU64,
    cfg: BusConfig,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventBus<T> {
    /// Creates a bus with the default [`BusConfig`].
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Creates a bus with the given configuration.
    pub fn with_config(cfg: BusConfig) -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            cfg,
        }
    }

    /// Appends a persistent listener to `name`'s list.
    ///
    /// No upper bound is enforced; see
    /// [`exceeds_warn_threshold`](Self::exceeds_warn_threshold) for the
    /// advisory growth check.
    pub fn on(
        &self,
        name: &str,
        callback: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.register(name, Arc::new(callback), false)
    }

    /// Appends a listener that fires at most once.
    ///
    /// The entry is removed from the table immediately before invocation.
    pub fn once(
        &self,
        name: &str,
        callback: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.register(name, Arc::new(callback), true)
    }

    /// Removes the registration identified by `id` from `name`'s list.
    ///
    /// Returns `true` if an entry was removed; a stale or foreign id is a
    /// no-op returning `false`.
    pub fn off(&self, name: &str, id: SubscriptionId) -> bool {
        let mut table = self.lock_table();
        let Some(entries) = table.get_mut(name) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() < before;
        if entries.is_empty() {
            table.remove(name);
        }
        removed
    }

    /// Returns the number of listeners currently registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.lock_table().get(name).map_or(0, Vec::len)
    }

    /// Returns whether `name`'s listener count exceeds the advisory
    /// [`BusConfig::listener_warn_threshold`].
    ///
    /// Callers worried about listener leaks check this; the bus itself never
    /// rejects a registration.
    pub fn exceeds_warn_threshold(&self, name: &str) -> bool {
        self.listener_count(name) > self.cfg.listener_warn_threshold
    }

    /// Synchronously invokes every current listener for `name`, in
    /// registration order, with a reference to `payload`.
    ///
    /// Returns `Ok(true)` if at least one listener existed, `Ok(false)` for
    /// an unlistened name other than [`ERROR_EVENT`].
    ///
    /// ## Errors
    /// - [`BusError::UnhandledError`] — `name == "error"` with zero
    ///   listeners.
    /// - [`BusError::ListenerFailed`] — a listener returned an error;
    ///   listeners later in the same emission are skipped. This fail-fast
    ///   choice is part of the contract (see module docs) and is pinned by
    ///   tests.
    pub fn emit(&self, name: &str, payload: &T) -> Result<bool, BusError>
    where
        T: fmt::Debug,
    {
        // Snapshot under the lock, strip once-entries, then invoke with the
        // lock released so listeners can reenter the bus.
        let snapshot: Vec<Arc<ListenerFn<T>>> = {
            let mut table = self.lock_table();
            match table.get_mut(name) {
                None => Vec::new(),
                Some(entries) => {
                    let callbacks = entries
                        .iter()
                        .map(|entry| Arc::clone(&entry.callback))
                        .collect();
                    entries.retain(|entry| !entry.once);
                    if entries.is_empty() {
                        table.remove(name);
                    }
                    callbacks
                }
            }
        };

        if snapshot.is_empty() {
            if name == ERROR_EVENT {
                return Err(BusError::UnhandledError {
                    detail: format!("{payload:?}"),
                });
            }
            return Ok(false);
        }

        for callback in snapshot {
            callback(payload).map_err(|error| BusError::ListenerFailed {
                event: name.to_string(),
                error,
            })?;
        }
        Ok(true)
    }

    fn register(&self, name: &str, callback: Arc<ListenerFn<T>>, once: bool) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, AtomicOrdering::Relaxed));
        self.lock_table()
            .entry(name.to_string())
            .or_default()
            .push(ListenerEntry { id, callback, once });
        id
    }

    fn lock_table(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<ListenerEntry<T>>>> {
        match self.listeners.lock() {
            Ok(guard) => guard,
            // Callbacks never run under the lock; recover the table.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_registration_order_is_delivery_order() {
        let bus: EventBus<()> = EventBus::new();
        let trace = Arc::new(Mutex::new(Vec::new()));

        for tag in ["L1", "L2", "L3"] {
            let trace = trace.clone();
            bus.on("tick", move |_| {
                trace.lock().unwrap().push(tag);
                Ok(())
            });
        }

        assert!(bus.emit("tick", &()).unwrap());
        assert_eq!(*trace.lock().unwrap(), vec!["L1", "L2", "L3"]);
    }

    #[test]
    fn test_unlistened_error_event_escalates() {
        let bus: EventBus<&str> = EventBus::new();

        let err = bus.emit(ERROR_EVENT, &"disk full").expect_err("must escalate");
        assert!(matches!(err, BusError::UnhandledError { .. }));

        // Any other unlistened name is a silent no-op.
        assert_eq!(bus.emit("warning", &"disk full").unwrap(), false);
    }

    #[test]
    fn test_listened_error_event_is_ordinary() {
        let bus: EventBus<&str> = EventBus::new();
        bus.on(ERROR_EVENT, |_| Ok(()));
        assert_eq!(bus.emit(ERROR_EVENT, &"handled").unwrap(), true);
    }

    #[test]
    fn test_once_fires_exactly_once() {
        let bus: EventBus<()> = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));

        let seen = hits.clone();
        bus.once("boot", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(bus.emit("boot", &()).unwrap(), true);
        assert_eq!(bus.emit("boot", &()).unwrap(), false);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count("boot"), 0);
    }

    #[test]
    fn test_off_removes_exactly_one_subscription() {
        let bus: EventBus<()> = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));

        let seen = hits.clone();
        let first = bus.on("box", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let seen = hits.clone();
        let _second = bus.on("box", move |_| {
            seen.fetch_add(10, Ordering::SeqCst);
            Ok(())
        });

        assert!(bus.off("box", first));
        assert!(!bus.off("box", first), "second removal is a no-op");
        assert_eq!(bus.listener_count("box"), 1);

        assert!(bus.emit("box", &()).unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 10, "only the second fires");
    }

    #[test]
    fn test_listener_error_skips_remaining_listeners() {
        let bus: EventBus<()> = EventBus::new();
        let hits = Arc::new(AtomicU32::new(0));

        bus.on("job", |_| Err("first failed".to_string()));
        let seen = hits.clone();
        bus.on("job", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let err = bus.emit("job", &()).expect_err("emission fails");
        assert!(matches!(err, BusError::ListenerFailed { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 0, "later listener skipped");

        // The failing registration stays; a later emit fails the same way.
        assert!(bus.emit("job", &()).is_err());
    }

    #[test]
    fn test_reentrant_emit_does_not_deadlock() {
        let bus: Arc<EventBus<u32>> = Arc::new(EventBus::new());
        let trace = Arc::new(Mutex::new(Vec::new()));

        let inner_trace = trace.clone();
        bus.on("inner", move |n: &u32| {
            inner_trace.lock().unwrap().push(*n);
            Ok(())
        });

        let reentrant = bus.clone();
        let outer_trace = trace.clone();
        bus.on("outer", move |n: &u32| {
            outer_trace.lock().unwrap().push(*n);
            reentrant.emit("inner", &(n + 1)).map(|_| ()).map_err(|e| e.to_string())
        });

        assert!(bus.emit("outer", &1).unwrap());
        assert_eq!(*trace.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_once_survives_reentrant_emit_at_most_once() {
        let bus: Arc<EventBus<()>> = Arc::new(EventBus::new());
        let hits = Arc::new(AtomicU32::new(0));

        let seen = hits.clone();
        let reentrant = bus.clone();
        bus.once("spark", move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            // Entry was stripped before this call: the nested emit sees none.
            assert_eq!(reentrant.emit("spark", &()).unwrap(), false);
            Ok(())
        });

        assert!(bus.emit("spark", &()).unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_warn_threshold_is_advisory_only() {
        let bus: EventBus<()> = EventBus::with_config(BusConfig {
            listener_warn_threshold: 2,
        });

        for _ in 0..3 {
            bus.on("crowded", |_| Ok(()));
        }
        assert_eq!(bus.listener_count("crowded"), 3);
        assert!(bus.exceeds_warn_threshold("crowded"));
        // Still no enforcement: a fourth registration is accepted.
        bus.on("crowded", |_| Ok(()));
        assert_eq!(bus.listener_count("crowded"), 4);
    }
}
