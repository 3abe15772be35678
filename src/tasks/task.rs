//! # Suspendable body abstraction.
//!
//! This module defines the [`Suspend`] trait, the polymorphic seam for units
//! of computation that can pause at defined points and resume with an
//! externally supplied value or error. The common handle type is
//! [`SuspendRef`], an `Arc<dyn Suspend>` suitable for handing to a
//! [`TaskHandle`](crate::TaskHandle).
//!
//! A body receives a [`Suspender`] and pauses through it; the driver (or the
//! runtime scheduler, for [`Suspender::await_external`]) decides when and
//! with what the body continues.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::suspender::Suspender;

/// Shared reference to a suspendable body.
pub type SuspendRef<Y, R, V> = Arc<dyn Suspend<Y, R, V>>;

/// # Suspendable unit of computation.
///
/// A `Suspend` body has a stable [`name`](Suspend::name) and an async
/// [`run`](Suspend::run) method that receives a [`Suspender`]. Each call to
/// [`Suspender::suspend`] is a suspension point: execution parks there until
/// the driver injects a value ([`resume`](crate::TaskHandle::resume)) or an
/// error ([`fail`](crate::TaskHandle::fail)).
///
/// Type parameters:
/// - `Y`: value handed to the driver at each suspension point
/// - `R`: value the driver injects on resume
/// - `V`: final value the body completes with
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use coflow::{Suspend, Suspender, TaskError};
///
/// struct Countdown;
///
/// #[async_trait]
/// impl Suspend<u32, (), u32> for Countdown {
///     fn name(&self) -> &str { "countdown" }
///
///     async fn run(&self, ctx: Suspender<u32, ()>) -> Result<u32, TaskError> {
///         for n in (1..=3).rev() {
///             ctx.suspend(n).await?;
///         }
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait Suspend<Y, R, V>: Send + Sync + 'static {
    /// Returns a stable, human-readable body name.
    fn name(&self) -> &str;

    /// Executes the body until completion or until an unhandled error.
    ///
    /// An `Err` returned from a suspension point was injected by the driver;
    /// the body may handle it or propagate it with `?`, in which case the
    /// task terminates as `Failed`.
    async fn run(&self, ctx: Suspender<Y, R>) -> Result<V, TaskError>;
}
