//! # Suspension capability handed to task bodies.
//!
//! [`Suspender`] is the only way a body can pause. It offers the two
//! resumption modes of the same primitive:
//!
//! - [`Suspender::suspend`] — **manual**: parks until the driver calls
//!   [`resume`](crate::TaskHandle::resume) or [`fail`](crate::TaskHandle::fail).
//! - [`Suspender::await_external`] — **automatic**: parks until an external
//!   asynchronous source settles; the runtime scheduler resumes the body with
//!   the settled value or error, no driver call involved.
//!
//! Both modes observe the task's [`CancellationToken`] at the suspension
//! point, so cancellation composes the same way in either mode.

use std::fmt;
use std::future::Future;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// One parked suspension: the yielded value plus the slot the driver fills.
pub(crate) struct Exchange<Y, R> {
    pub(crate) yielded: Y,
    pub(crate) reply: oneshot::Sender<Result<R, TaskError>>,
}

/// Capability to pause the running body and be resumed with a value or error.
///
/// Handed to the body by the driver; not cloneable, so a body has exactly one
/// suspension identity and the driver sees suspension points in order.
pub struct Suspender<Y, R> {
    tx: mpsc::UnboundedSender<Exchange<Y, R>>,
    token: CancellationToken,
}

impl<Y, R> Suspender<Y, R> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Exchange<Y, R>>, token: CancellationToken) -> Self {
        Self { tx, token }
    }

    /// Parks the body at a manual suspension point.
    ///
    /// Hands `yielded` to the driver and waits for the next
    /// [`resume`](crate::TaskHandle::resume) (returns `Ok(value)`) or
    /// [`fail`](crate::TaskHandle::fail) (returns `Err(error)` for the body's
    /// own error handling to catch, or to propagate with `?`).
    ///
    /// Returns [`TaskError::Canceled`] if the task's token is cancelled, or
    /// if the driver handle was dropped while the body was parked.
    pub async fn suspend(&self, yielded: Y) -> Result<R, TaskError> {
        if self.token.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        let (reply, slot) = oneshot::channel();
        if self.tx.send(Exchange { yielded, reply }).is_err() {
            // Driver handle dropped: nobody can resume us.
            return Err(TaskError::Canceled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(TaskError::Canceled),
            injected = slot => match injected {
                Ok(outcome) => outcome,
                Err(_) => Err(TaskError::Canceled),
            },
        }
    }

    /// Parks the body at an automatic suspension point.
    ///
    /// Awaits `source`; when it settles, the runtime scheduler resumes the
    /// body with the settled value or error. Resumption order across several
    /// concurrently parked tasks follows settlement order, not the order the
    /// `await_external` calls were issued.
    pub async fn await_external<T, E>(
        &self,
        source: impl Future<Output = Result<T, E>>,
    ) -> Result<T, TaskError>
    where
        E: fmt::Display,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(TaskError::Canceled),
            settled = source => settled.map_err(|e| TaskError::fail(e.to_string())),
        }
    }

    /// Returns whether the task's cancellation token has been triggered.
    ///
    /// Bodies running long synchronous stretches between suspension points
    /// can poll this to exit early.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
