//! # Function-backed body (`SuspendFn`)
//!
//! [`SuspendFn`] wraps a closure `F: Fn(Suspender) -> Fut`, producing a fresh
//! future per start. This avoids shared mutable state between runs.
//!
//! ## Concurrency semantics
//! - Each [`TaskHandle::start`](crate::TaskHandle::start) creates a **new**
//!   future owning its own state.
//! - No hidden mutation between starts; if shared state is needed, move an
//!   `Arc<...>` into the closure explicitly.
//!
//! ## Example
//! ```
//! use coflow::{SuspendFn, SuspendRef, Suspender, TaskError};
//!
//! let body: SuspendRef<u32, (), u32> = SuspendFn::arc("ticker", |ctx: Suspender<u32, ()>| async move {
//!     ctx.suspend(1).await?;
//!     ctx.suspend(2).await?;
//!     Ok::<_, TaskError>(3)
//! });
//!
//! assert_eq!(body.name(), "ticker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::suspender::Suspender;
use crate::tasks::task::Suspend;

/// Function-backed body implementation.
///
/// Wraps a closure that *creates* a new future per start.
#[derive(Debug)]
pub struct SuspendFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SuspendFn<F> {
    /// Creates a new function-backed body.
    ///
    /// Prefer [`SuspendFn::arc`] when you immediately need a [`SuspendRef`](crate::SuspendRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the body and returns it as a shared handle (`Arc<SuspendFn>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, Y, R, V> Suspend<Y, R, V> for SuspendFn<F>
where
    F: Fn(Suspender<Y, R>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<V, TaskError>> + Send + 'static,
    Y: Send + 'static,
    R: Send + 'static,
    V: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Suspender<Y, R>) -> Result<V, TaskError> {
        (self.f)(ctx).await
    }
}
