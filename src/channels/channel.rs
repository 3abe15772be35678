//! # Flow-controlled conduit with a bounded buffer and explicit backpressure.
//!
//! [`Channel`] is a FIFO producer/consumer conduit. Writes report a
//! backpressure flag once the buffer reaches capacity; the producer is
//! expected to pause until the drained signal fires. Reads after close-and-
//! drain return [`ReadOutcome::EndOfStream`], never an error.
//!
//! ## State machine
//! ```text
//! Flowing ──(len >= capacity)──► Blocked
//!    ▲                             │
//!    └──(len <= low_water, fires drained hooks)
//!
//! close() with non-empty buffer ──► Closing ──(buffer drains)──► Closed
//! close() with empty buffer     ──────────────────────────────► Closed
//! ```
//!
//! ## Rules
//! - **Transient overflow**: the write that crosses `capacity` completes and
//!   reports `backpressure = true`; under [`OverflowPolicy::Queue`] further
//!   writes also complete (silently queued) while the channel stays blocked.
//!   Under [`OverflowPolicy::Reject`] they fail with
//!   [`ChannelError::BackpressureViolation`].
//! - **Write after close** fails hard with [`ChannelError::Closed`].
//! - **Drained hooks are one-shot**: registered via [`Channel::on_drained`],
//!   consumed in a single batch when the buffer falls to the low-water mark.
//!
//! The handle is cheap to clone (internally an `Arc`-backed shared state);
//! clones observe the same buffer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{oneshot, Notify};

use crate::channels::config::{ChannelConfig, OverflowPolicy};
use crate::error::ChannelError;

/// Flow state of a channel, derived from its buffer and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Open, accepting writes without backpressure.
    Flowing,
    /// Open, buffer at or above capacity; producer should pause.
    Blocked,
    /// Closed with items still buffered; reads continue to drain.
    Closing,
    /// Closed and drained; reads return [`ReadOutcome::EndOfStream`].
    Closed,
}

impl ChannelState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelState::Flowing => "flowing",
            ChannelState::Blocked => "blocked",
            ChannelState::Closing => "closing",
            ChannelState::Closed => "closed",
        }
    }
}

/// Result of a successful [`Channel::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The item was appended to the buffer. Always `true` on `Ok`; rejected
    /// writes surface as errors instead.
    pub accepted: bool,
    /// The channel is at or above capacity; pause until the drained signal.
    pub backpressure: bool,
}

/// Result of a [`Channel::read`]/[`Channel::recv`].
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// Up to `max` items in FIFO order. Empty only when the channel is open
    /// with nothing buffered (plain `read`) or `max == 0`.
    Items(Vec<T>),
    /// The channel is closed and fully drained. Terminal.
    EndOfStream,
}

impl<T> ReadOutcome<T> {
    /// Returns `true` for [`ReadOutcome::EndOfStream`].
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }

    /// Returns the items, or an empty vec at end-of-stream.
    pub fn into_items(self) -> Vec<T> {
        match self {
            ReadOutcome::Items(items) => items,
            ReadOutcome::EndOfStream => Vec::new(),
        }
    }
}

struct Inner<T> {
    buffer: VecDeque<T>,
    blocked: bool,
    closed: bool,
    drained_hooks: Vec<Box<dyn FnOnce() + Send>>,
}

struct Shared<T> {
    cfg: ChannelConfig,
    inner: Mutex<Inner<T>>,
    readable: Notify,
}

/// Producer/consumer conduit with a bounded buffer and an explicit
/// backpressure signal.
///
/// ## Example
/// ```
/// use coflow::{Channel, ChannelConfig, ReadOutcome};
///
/// let chan: Channel<u8> = Channel::with_config(ChannelConfig::with_capacity(2));
///
/// assert!(!chan.write(b'a').unwrap().backpressure);
/// assert!(chan.write(b'b').unwrap().backpressure); // crossed capacity
///
/// assert_eq!(chan.read(8).into_items(), vec![b'a', b'b']);
/// chan.close();
/// assert!(chan.read(8).is_end_of_stream());
/// ```
pub struct Channel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Channel<T> {
    /// Creates a channel with the default [`ChannelConfig`].
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    /// Creates a channel with the given configuration.
    pub fn with_config(cfg: ChannelConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                cfg,
                inner: Mutex::new(Inner {
                    buffer: VecDeque::new(),
                    blocked: false,
                    closed: false,
                    drained_hooks: Vec::new(),
                }),
                readable: Notify::new(),
            }),
        }
    }

    /// Returns the channel's configuration.
    pub fn config(&self) -> ChannelConfig {
        self.shared.cfg
    }

    /// Returns the current flow state.
    pub fn state(&self) -> ChannelState {
        let inner = self.lock_inner();
        match (inner.closed, inner.buffer.is_empty(), inner.blocked) {
            (true, true, _) => ChannelState::Closed,
            (true, false, _) => ChannelState::Closing,
            (false, _, true) => ChannelState::Blocked,
            (false, _, false) => ChannelState::Flowing,
        }
    }

    /// Returns the number of currently buffered items.
    pub fn len(&self) -> usize {
        self.lock_inner().buffer.len()
    }

    /// Returns whether the buffer is currently empty.
    pub fn is_empty(&self) -> bool {
        self.lock_inner().buffer.is_empty()
    }

    /// Returns whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.lock_inner().closed
    }

    /// Appends `item` to the buffer.
    ///
    /// `backpressure = true` in the outcome means the buffer is at or above
    /// capacity: pause and wait for [`on_drained`](Self::on_drained) (or
    /// [`drained`](Self::drained)) before writing more.
    ///
    /// ## Errors
    /// - [`ChannelError::Closed`] — the channel was closed.
    /// - [`ChannelError::BackpressureViolation`] — the channel is blocked and
    ///   configured with [`OverflowPolicy::Reject`].
    pub fn write(&self, item: T) -> Result<WriteOutcome, ChannelError> {
        let outcome = {
            let mut inner = self.lock_inner();
            if inner.closed {
                return Err(ChannelError::Closed);
            }
            if inner.blocked && self.shared.cfg.overflow == OverflowPolicy::Reject {
                return Err(ChannelError::BackpressureViolation);
            }
            inner.buffer.push_back(item);
            if inner.buffer.len() >= self.shared.cfg.capacity_clamped() {
                inner.blocked = true;
            }
            WriteOutcome {
                accepted: true,
                backpressure: inner.blocked,
            }
        };
        self.shared.readable.notify_waiters();
        Ok(outcome)
    }

    /// Removes and returns up to `max` items in FIFO order.
    ///
    /// Returns [`ReadOutcome::EndOfStream`] only when the channel is closed
    /// and the buffer is empty; an open empty channel yields an empty batch.
    /// Crossing the low-water mark on a blocked channel fires the drained
    /// hooks (exactly once per blocked episode).
    pub fn read(&self, max: usize) -> ReadOutcome<T> {
        match self.collect(max) {
            Some(outcome) => outcome,
            None => ReadOutcome::Items(Vec::new()),
        }
    }

    /// Like [`read`](Self::read), but waits until at least one item is
    /// buffered or the channel closes.
    ///
    /// This is the read side of a pipe loop: it never returns an empty batch
    /// for `max >= 1`.
    pub async fn recv(&self, max: usize) -> ReadOutcome<T> {
        loop {
            let mut notified = std::pin::pin!(self.shared.readable.notified());
            // Register interest before checking, so a write racing with the
            // check cannot be missed.
            notified.as_mut().enable();
            if let Some(outcome) = self.collect(max) {
                return outcome;
            }
            notified.await;
        }
    }

    /// Registers a one-shot callback fired when the buffer falls to or below
    /// the low-water mark after backpressure was signaled.
    ///
    /// If the channel is not currently blocked, the callback fires
    /// immediately: registration would otherwise race against a concurrent
    /// drain, and pipe loops depend on the signal always arriving.
    pub fn on_drained(&self, callback: impl FnOnce() + Send + 'static) {
        let immediate: Option<Box<dyn FnOnce() + Send>> = {
            let mut inner = self.lock_inner();
            if inner.blocked {
                inner.drained_hooks.push(Box::new(callback));
                None
            } else {
                Some(Box::new(callback))
            }
        };
        if let Some(callback) = immediate {
            callback();
        }
    }

    /// Future form of [`on_drained`](Self::on_drained): resolves on the next
    /// drained signal (immediately if the channel is not blocked).
    pub async fn drained(&self) {
        let (tx, rx) = oneshot::channel();
        self.on_drained(move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Marks the channel closed.
    ///
    /// Idempotent. A non-empty buffer keeps draining through reads
    /// (`Closing`); once empty the channel is `Closed` and reads return
    /// [`ReadOutcome::EndOfStream`]. Subsequent writes fail with
    /// [`ChannelError::Closed`].
    pub fn close(&self) {
        {
            let mut inner = self.lock_inner();
            inner.closed = true;
        }
        self.shared.readable.notify_waiters();
    }

    /// Drains up to `max` items; `None` means open-and-empty (caller decides
    /// whether to wait or return an empty batch).
    fn collect(&self, max: usize) -> Option<ReadOutcome<T>> {
        let (items, hooks) = {
            let mut inner = self.lock_inner();
            if inner.buffer.is_empty() {
                return if inner.closed {
                    Some(ReadOutcome::EndOfStream)
                } else {
                    None
                };
            }
            let n = max.min(inner.buffer.len());
            let items: Vec<T> = inner.buffer.drain(..n).collect();
            let mut hooks = Vec::new();
            if inner.blocked && inner.buffer.len() <= self.shared.cfg.low_water_clamped() {
                inner.blocked = false;
                hooks = std::mem::take(&mut inner.drained_hooks);
            }
            (items, hooks)
        };
        for hook in hooks {
            hook();
        }
        Some(ReadOutcome::Items(items))
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner<T>> {
        match self.shared.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn chan(capacity: usize, low_water: usize) -> Channel<u32> {
        Channel::with_config(ChannelConfig {
            capacity,
            low_water,
            overflow: OverflowPolicy::Queue,
        })
    }

    #[test]
    fn test_backpressure_signaled_on_threshold_crossing() {
        let c = chan(3, 1);

        assert!(!c.write(1).unwrap().backpressure);
        assert!(!c.write(2).unwrap().backpressure);
        let crossing = c.write(3).unwrap();
        assert!(crossing.accepted);
        assert!(crossing.backpressure, "third write crosses capacity");
        assert_eq!(c.state(), ChannelState::Blocked);
    }

    #[test]
    fn test_queue_policy_admits_over_threshold_writes() {
        let c = chan(2, 1);
        let _ = c.write(1).unwrap();
        let _ = c.write(2).unwrap();

        let over = c.write(3).unwrap();
        assert!(over.accepted, "queue policy keeps accepting");
        assert!(over.backpressure);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_reject_policy_fails_blocked_writes() {
        let c: Channel<u32> = Channel::with_config(ChannelConfig {
            capacity: 2,
            low_water: 1,
            overflow: OverflowPolicy::Reject,
        });
        let _ = c.write(1).unwrap();
        let _ = c.write(2).unwrap();

        let err = c.write(3).expect_err("blocked write must fail");
        assert_eq!(err, ChannelError::BackpressureViolation);
        assert_eq!(c.len(), 2, "rejected item is not buffered");
    }

    #[test]
    fn test_write_after_close_fails_hard() {
        let c = chan(4, 2);
        c.close();
        assert_eq!(c.write(1).expect_err("closed"), ChannelError::Closed);
    }

    #[test]
    fn test_read_is_fifo_and_bounded_by_max() {
        let c = chan(8, 4);
        for n in 1..=5 {
            let _ = c.write(n).unwrap();
        }
        assert_eq!(c.read(2).into_items(), vec![1, 2]);
        assert_eq!(c.read(16).into_items(), vec![3, 4, 5]);
        assert_eq!(c.read(1).into_items(), Vec::<u32>::new(), "open and empty");
    }

    #[test]
    fn test_end_of_stream_only_after_close_and_drain() {
        let c = chan(4, 2);
        let _ = c.write(7).unwrap();
        c.close();

        assert_eq!(c.state(), ChannelState::Closing);
        assert_eq!(c.read(4).into_items(), vec![7]);
        assert_eq!(c.state(), ChannelState::Closed);
        assert!(c.read(4).is_end_of_stream());
        // Reads stay at end-of-stream, never an error.
        assert!(c.read(4).is_end_of_stream());
    }

    #[test]
    fn test_drained_hook_fires_exactly_once_at_low_water() {
        let c = chan(4, 2);
        for n in 0..4 {
            let _ = c.write(n).unwrap();
        }
        assert_eq!(c.state(), ChannelState::Blocked);

        let fired = Arc::new(AtomicU32::new(0));
        let hits = fired.clone();
        c.on_drained(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        let _ = c.read(1); // len 3 > low_water: no signal yet
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let _ = c.read(1); // len 2 == low_water: signal
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(c.state(), ChannelState::Flowing);

        let _ = c.read(4); // further drains do not re-fire
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drained_hook_fires_immediately_when_not_blocked() {
        let c = chan(4, 2);
        let fired = Arc::new(AtomicU32::new(0));
        let hits = fired.clone();
        c.on_drained(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_state_machine_walk() {
        let c = chan(2, 0);
        assert_eq!(c.state(), ChannelState::Flowing);

        let _ = c.write(1).unwrap();
        let _ = c.write(2).unwrap();
        assert_eq!(c.state(), ChannelState::Blocked);

        assert_eq!(c.read(4).into_items(), vec![1, 2]);
        assert_eq!(c.state(), ChannelState::Flowing);

        let _ = c.write(3).unwrap();
        c.close();
        assert_eq!(c.state(), ChannelState::Closing);

        let _ = c.read(4);
        assert_eq!(c.state(), ChannelState::Closed);
    }

    #[tokio::test]
    async fn test_recv_waits_for_writer() {
        let c = chan(4, 2);
        let writer = c.clone();
        let write_side = tokio::spawn(async move {
            writer.write(11).expect("write");
            writer.close();
        });

        assert_eq!(c.recv(4).await.into_items(), vec![11]);
        assert!(c.recv(4).await.is_end_of_stream());
        write_side.await.expect("writer");
    }

    #[tokio::test]
    async fn test_drained_future_resolves_after_drain() {
        let c = chan(2, 0);
        let _ = c.write(1).unwrap();
        let _ = c.write(2).unwrap();
        assert_eq!(c.state(), ChannelState::Blocked);

        let waiter = c.clone();
        let drained = tokio::spawn(async move { waiter.drained().await });

        let _ = c.read(4);
        drained.await.expect("drained future resolves");
    }
}
