//! # Suspendable tasks: bodies, suspension capability, and the driver handle.
//!
//! This module provides the core task-related types:
//! - [`Suspend`] - trait for implementing suspendable task bodies
//! - [`SuspendFn`] - function-based body implementation
//! - [`SuspendRef`] - shared reference to a body (`Arc<dyn Suspend>`)
//! - [`Suspender`] - the capability a body uses to pause and be resumed
//! - [`TaskHandle`] - the driver side: `start` / `resume` / `fail`
//! - [`Step`], [`TaskState`] - per-drive outcomes and the lifecycle state
//!
//! ## Quick wiring
//! ```text
//! SuspendFn (body) ──► TaskHandle::new ──► start()
//!                                            │
//!                 ┌──────────────────────────┤
//!                 ▼                          ▼
//!        Step::Suspended(y)          Step::Completed(v) / Step::Failed(e)
//!                 │
//!         resume(value) / fail(error) ──► next Step
//! ```
//!
//! Manual and automatic resumption are the *same* suspension primitive:
//! [`Suspender::suspend`] parks the body until the driver injects a value or
//! error, while [`Suspender::await_external`] parks it until an external
//! asynchronous source settles and the runtime scheduler resumes it.

mod driver;
mod suspender;
mod task;
mod task_fn;

pub use driver::{Step, TaskHandle, TaskState};
pub use suspender::Suspender;
pub use task::{Suspend, SuspendRef};
pub use task_fn::SuspendFn;
