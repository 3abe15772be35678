//! # coflow
//!
//! **coflow** is a small library of cooperative-execution primitives for Rust.
//!
//! It provides three independent building blocks — suspendable tasks, a
//! synchronous event bus, and flow-controlled channels — designed as leaf
//! components for higher-level pipelines and schedulers. None of the three
//! depends on the others.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌─────────────────────────────┐  ┌──────────────────────────────┐
//!  │  SuspendFn / Suspend (body) │  │        EventBus              │
//!  └─────────────┬───────────────┘  │  on / once / off / emit      │
//!                ▼                  │  - registration order        │
//!  ┌─────────────────────────────┐  │  - emit is synchronous       │
//!  │  TaskHandle (driver)        │  │  - "error" escalates when    │
//!  │  start / resume / fail      │  │    unlistened                │
//!  │       │                     │  └──────────────────────────────┘
//!  │       ▼                     │
//!  │  Step::Suspended(y)         │  ┌──────────────────────────────┐
//!  │  Step::Completed(v)         │  │  Channel                     │
//!  │  Step::Failed(e)            │  │  write ──► [buffer] ──► read │
//!  └─────────────────────────────┘  │  - backpressure at capacity  │
//!                                   │  - drained at low_water      │
//!  Suspender inside the body:       │  - pipe_to / transform       │
//!  - suspend(y): manual resumption  │  - EndOfStream after close   │
//!  - await_external(fut): automatic │    and drain                 │
//!  - both honor cancellation        └──────────────────────────────┘
//! ```
//!
//! ### Scheduling model
//! Single logical thread of control per task/bus/channel instance:
//! concurrency comes from interleaving many suspended tasks on the runtime,
//! not from parallel mutation. Suspension happens only at explicit
//! [`Suspender`] calls inside a body and at backpressure-blocked writes
//! inside a pipe loop; [`EventBus::emit`] never suspends. Tasks have no
//! implicit cancellation — compose a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) via
//! [`TaskHandle::with_cancellation`], checked at each suspension point.
//!
//! ## Features
//! | Area          | Description                                               | Key types / traits                     |
//! |---------------|-----------------------------------------------------------|----------------------------------------|
//! | **Tasks**     | Pause at defined points; resume with a value or an error. | [`Suspend`], [`SuspendFn`], [`TaskHandle`], [`Step`] |
//! | **Events**    | Named events, ordered listeners, synchronous delivery.    | [`EventBus`], [`SubscriptionId`]       |
//! | **Channels**  | Bounded FIFO conduits with explicit backpressure.         | [`Channel`], [`WriteOutcome`], [`ReadOutcome`] |
//! | **Deferral**  | Run after the current turn, as an explicit capability.    | [`defer_after_current_turn`]           |
//! | **Errors**    | Typed errors per component.                               | [`DriveError`], [`TaskError`], [`BusError`], [`ChannelError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple stdout bus listener _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use coflow::{Channel, EventBus, Step, SuspendFn, SuspendRef, Suspender, TaskError, TaskHandle};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A task that yields twice, then completes with the injected value.
//!     let body: SuspendRef<u32, u32, u32> =
//!         SuspendFn::arc("steps", |ctx: Suspender<u32, u32>| async move {
//!             ctx.suspend(1).await?;
//!             let injected = ctx.suspend(2).await?;
//!             Ok::<_, TaskError>(injected)
//!         });
//!
//!     let mut handle = TaskHandle::new(body);
//!     assert!(matches!(handle.start().await?, Step::Suspended(1)));
//!     assert!(matches!(handle.resume(0).await?, Step::Suspended(2)));
//!     assert!(matches!(handle.resume(99).await?, Step::Completed(99)));
//!
//!     // A bus delivering in registration order, synchronously.
//!     let bus: EventBus<u32> = EventBus::new();
//!     bus.on("step", |n: &u32| {
//!         println!("step={n}");
//!         Ok(())
//!     });
//!     bus.emit("step", &99)?;
//!
//!     // A channel pipeline with backpressure.
//!     let source: Channel<u32> = Channel::new();
//!     let doubled = source.transform(|n| n * 2);
//!     source.write(21)?;
//!     source.close();
//!     assert_eq!(doubled.recv(1).await.into_items(), vec![42]);
//!     Ok(())
//! }
//! ```

mod channels;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use channels::{Channel, ChannelConfig, ChannelState, OverflowPolicy, ReadOutcome, WriteOutcome};
pub use error::{BusError, ChannelError, DriveError, TaskError};
pub use events::{defer_after_current_turn, BusConfig, EventBus, SubscriptionId, ERROR_EVENT};
pub use tasks::{Step, Suspend, SuspendFn, SuspendRef, Suspender, TaskHandle, TaskState};

// Optional: expose a simple stdout bus listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::stdout_listener;
