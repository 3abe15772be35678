//! # Driver handle: starts a body and steps it between suspension points.
//!
//! [`TaskHandle`] owns the spawned body and exposes the driver contract:
//! [`start`](TaskHandle::start) runs to the first suspension point or
//! termination, [`resume`](TaskHandle::resume) / [`fail`](TaskHandle::fail)
//! inject a value or error into the pending suspension and run to the next
//! one. Every drive operation returns a [`Step`].
//!
//! ## Lifecycle
//! ```text
//! TaskHandle::new(body)                      state = Created
//!        │ start()
//!        ▼
//!   ┌─ Suspended(y) ◄────────────┐           state = Suspended
//!   │        │ resume(v) / fail(e)
//!   │        ▼                   │           state = Running (while stepping)
//!   │   next suspension ─────────┘
//!   │        │
//!   │        ▼
//!   └─► Completed(v) | Failed(e)             state = Completed | Failed
//! ```
//!
//! ## Rules
//! - Exactly one `resume`/`fail` may be outstanding between two suspension
//!   points; a second injection without an intervening `Suspended` step fails
//!   with [`DriveError::InvalidState`].
//! - Driving a terminal task always fails with [`DriveError::InvalidState`].
//! - The first drive call is always `start`; `resume` before `start` is
//!   rejected the same way.
//! - Dropping the handle cancels the task's token; the body observes the
//!   cancellation at its next suspension point.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{DriveError, TaskError};
use crate::tasks::suspender::{Exchange, Suspender};
use crate::tasks::task::SuspendRef;

/// Lifecycle state of a suspendable task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Constructed, not yet started.
    Created,
    /// A drive operation is currently executing the body.
    Running,
    /// Parked at a suspension point, waiting for `resume`/`fail`.
    Suspended,
    /// Terminated with a value. Terminal.
    Completed,
    /// Terminated with an error. Terminal.
    Failed,
}

impl TaskState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Running => "running",
            TaskState::Suspended => "suspended",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        }
    }

    /// Returns `true` for [`TaskState::Completed`] and [`TaskState::Failed`].
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

/// Outcome of a single drive operation (`start`, `resume`, or `fail`).
#[derive(Debug)]
pub enum Step<Y, V> {
    /// The body parked at a suspension point and yielded this value.
    Suspended(Y),
    /// The body terminated with a value.
    Completed(V),
    /// The body terminated with an error (unhandled injection, own failure,
    /// cancellation, or panic).
    Failed(TaskError),
}

impl<Y, V> Step<Y, V> {
    /// Returns `true` if this step parked at a suspension point.
    pub fn is_suspended(&self) -> bool {
        matches!(self, Step::Suspended(_))
    }

    /// Returns the yielded value if this step is `Suspended`.
    pub fn yielded(&self) -> Option<&Y> {
        match self {
            Step::Suspended(y) => Some(y),
            _ => None,
        }
    }
}

/// Internal drive phase; `TaskState` is the caller-visible projection.
enum Phase<Y, R, V> {
    Created(SuspendRef<Y, R, V>),
    Live {
        rx: mpsc::UnboundedReceiver<Exchange<Y, R>>,
        join: JoinHandle<Result<V, TaskError>>,
        pending: Option<tokio::sync::oneshot::Sender<Result<R, TaskError>>>,
    },
    Done,
}

/// Driver handle for a suspendable task.
///
/// ## Example
/// ```
/// use coflow::{Step, SuspendFn, SuspendRef, Suspender, TaskError, TaskHandle, TaskState};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let body: SuspendRef<i32, i32, i32> = SuspendFn::arc("adder", |ctx: Suspender<i32, i32>| async move {
///     let injected = ctx.suspend(1).await?;
///     Ok::<_, TaskError>(injected + 1)
/// });
///
/// let mut handle = TaskHandle::new(body);
/// assert_eq!(handle.state(), TaskState::Created);
///
/// let step = handle.start().await.unwrap();
/// assert!(matches!(step, Step::Suspended(1)));
///
/// let step = handle.resume(41).await.unwrap();
/// assert!(matches!(step, Step::Completed(42)));
/// assert!(handle.state().is_terminal());
/// # }
/// ```
pub struct TaskHandle<Y, R, V> {
    name: String,
    state: TaskState,
    token: CancellationToken,
    phase: Phase<Y, R, V>,
}

impl<Y, R, V> TaskHandle<Y, R, V>
where
    Y: Send + 'static,
    R: Send + 'static,
    V: Send + 'static,
{
    /// Creates a handle for the given body. The task starts in
    /// [`TaskState::Created`]; nothing runs until [`start`](Self::start).
    pub fn new(body: SuspendRef<Y, R, V>) -> Self {
        Self {
            name: body.name().to_string(),
            state: TaskState::Created,
            token: CancellationToken::new(),
            phase: Phase::Created(body),
        }
    }

    /// Attaches an externally owned cancellation token.
    ///
    /// Only meaningful before [`start`](Self::start); the body captures the
    /// token at spawn time.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Returns the body's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task's current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Cancels the task's token.
    ///
    /// The body observes the cancellation at its next suspension point and
    /// terminates as `Failed(TaskError::Canceled)`; drive once more to
    /// collect that step.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Begins execution and runs to the first suspension point or termination.
    ///
    /// Fails with [`DriveError::InvalidState`] if the task was already
    /// started.
    pub async fn start(&mut self) -> Result<Step<Y, V>, DriveError> {
        let body = match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Created(body) => body,
            other => {
                self.phase = other;
                return Err(self.invalid_state());
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = Suspender::new(tx, self.token.clone());
        let join = tokio::spawn(async move { body.run(ctx).await });
        self.phase = Phase::Live {
            rx,
            join,
            pending: None,
        };
        Ok(self.step().await)
    }

    /// Injects `value` as the result of the pending suspension point and runs
    /// to the next suspension point or termination.
    ///
    /// A value the body chooses to ignore is permitted and simply dropped.
    /// Fails with [`DriveError::InvalidState`] when no suspension is pending.
    pub async fn resume(&mut self, value: R) -> Result<Step<Y, V>, DriveError> {
        self.inject(Ok(value)).await
    }

    /// Injects `error` to be raised at the pending suspension point.
    ///
    /// The body's own error handling may catch it and continue; uncaught, the
    /// task terminates as `Failed`. Fails with [`DriveError::InvalidState`]
    /// when no suspension is pending.
    pub async fn fail(&mut self, error: TaskError) -> Result<Step<Y, V>, DriveError> {
        self.inject(Err(error)).await
    }

    fn invalid_state(&self) -> DriveError {
        DriveError::InvalidState {
            state: self.state.as_label(),
        }
    }

    async fn inject(&mut self, outcome: Result<R, TaskError>) -> Result<Step<Y, V>, DriveError> {
        let reply = match &mut self.phase {
            Phase::Live { pending, .. } => match pending.take() {
                Some(reply) => reply,
                None => return Err(self.invalid_state()),
            },
            Phase::Created(_) | Phase::Done => return Err(self.invalid_state()),
        };
        // If the body abandoned the suspension (e.g. cancelled meanwhile),
        // the send fails and step() observes the terminal outcome instead.
        let _ = reply.send(outcome);
        Ok(self.step().await)
    }

    /// Runs the body until the next suspension point or termination.
    async fn step(&mut self) -> Step<Y, V> {
        self.state = TaskState::Running;
        let step = match &mut self.phase {
            Phase::Live { rx, join, pending } => match rx.recv().await {
                Some(exchange) => {
                    *pending = Some(exchange.reply);
                    Step::Suspended(exchange.yielded)
                }
                // The body dropped its Suspender: it terminated. Join it.
                None => match join.await {
                    Ok(Ok(value)) => Step::Completed(value),
                    Ok(Err(error)) => Step::Failed(error),
                    Err(join_error) => Step::Failed(TaskError::Panicked {
                        reason: join_error.to_string(),
                    }),
                },
            },
            Phase::Created(_) | Phase::Done => {
                Step::Failed(TaskError::fail("task is not live"))
            }
        };

        match &step {
            Step::Suspended(_) => self.state = TaskState::Suspended,
            Step::Completed(_) => {
                self.state = TaskState::Completed;
                self.phase = Phase::Done;
            }
            Step::Failed(_) => {
                self.state = TaskState::Failed;
                self.phase = Phase::Done;
            }
        }
        step
    }
}

impl<Y, R, V> Drop for TaskHandle<Y, R, V> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::task_fn::SuspendFn;

    fn counter_body() -> SuspendRef<i32, i32, i32> {
        SuspendFn::arc("counter", |ctx: Suspender<i32, i32>| async move {
            ctx.suspend(1).await?;
            let injected = ctx.suspend(2).await?;
            Ok(injected - 97)
        })
    }

    #[tokio::test]
    async fn test_yield_yield_complete_scenario() {
        let mut handle = TaskHandle::new(counter_body());

        let step = handle.start().await.expect("start");
        assert!(matches!(step, Step::Suspended(1)), "got {step:?}");
        assert_eq!(handle.state(), TaskState::Suspended);

        let step = handle.resume(0).await.expect("first resume");
        assert!(matches!(step, Step::Suspended(2)), "got {step:?}");

        let step = handle.resume(100).await.expect("second resume");
        assert!(matches!(step, Step::Completed(3)), "got {step:?}");
        assert_eq!(handle.state(), TaskState::Completed);

        let err = handle.resume(0).await.expect_err("terminal resume");
        assert!(matches!(err, DriveError::InvalidState { state: "completed" }));
    }

    #[tokio::test]
    async fn test_resume_before_start_is_invalid() {
        let mut handle = TaskHandle::new(counter_body());
        let err = handle.resume(0).await.expect_err("resume on created");
        assert!(matches!(err, DriveError::InvalidState { state: "created" }));
        assert_eq!(handle.state(), TaskState::Created);
    }

    #[tokio::test]
    async fn test_double_start_is_invalid() {
        let mut handle = TaskHandle::new(counter_body());
        let _ = handle.start().await.expect("start");
        let err = handle.start().await.expect_err("second start");
        assert!(matches!(err, DriveError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_injected_error_caught_by_body() {
        let body: SuspendRef<i32, i32, i32> =
            SuspendFn::arc("resilient", |ctx: Suspender<i32, i32>| async move {
                match ctx.suspend(1).await {
                    Ok(v) => Ok(v),
                    Err(_) => Ok(-1), // fallback path
                }
            });
        let mut handle = TaskHandle::new(body);

        let _ = handle.start().await.expect("start");
        let step = handle.fail(TaskError::fail("boom")).await.expect("fail");
        assert!(matches!(step, Step::Completed(-1)), "got {step:?}");
    }

    #[tokio::test]
    async fn test_injected_error_uncaught_fails_task() {
        let mut handle = TaskHandle::new(counter_body());

        let _ = handle.start().await.expect("start");
        let step = handle.fail(TaskError::fail("boom")).await.expect("fail");
        match step {
            Step::Failed(TaskError::Fail { error }) => assert_eq!(error, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(handle.state(), TaskState::Failed);
    }

    #[tokio::test]
    async fn test_completion_without_suspension() {
        let body: SuspendRef<i32, (), &'static str> =
            SuspendFn::arc("instant", |_ctx: Suspender<i32, ()>| async move {
                Ok::<_, TaskError>("done")
            });
        let mut handle = TaskHandle::new(body);

        let step = handle.start().await.expect("start");
        assert!(matches!(step, Step::Completed("done")));
        assert_eq!(handle.state(), TaskState::Completed);
    }

    #[tokio::test]
    async fn test_await_external_resumes_automatically() {
        let body: SuspendRef<i32, (), u64> =
            SuspendFn::arc("external", |ctx: Suspender<i32, ()>| async move {
                let settled = ctx
                    .await_external(async { Ok::<u64, String>(7) })
                    .await?;
                Ok(settled * 6)
            });
        let mut handle = TaskHandle::new(body);

        // No driver involvement between start and completion: the scheduler
        // resumes the body when the external source settles.
        let step = handle.start().await.expect("start");
        assert!(matches!(step, Step::Completed(42)), "got {step:?}");
    }

    #[tokio::test]
    async fn test_await_external_error_fails_task() {
        let body: SuspendRef<i32, (), u64> =
            SuspendFn::arc("external-err", |ctx: Suspender<i32, ()>| async move {
                let settled = ctx
                    .await_external(async { Err::<u64, String>("offline".into()) })
                    .await?;
                Ok(settled)
            });
        let mut handle = TaskHandle::new(body);

        let step = handle.start().await.expect("start");
        match step {
            Step::Failed(TaskError::Fail { error }) => assert_eq!(error, "offline"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_observed_at_suspension_point() {
        let mut handle = TaskHandle::new(counter_body());

        let _ = handle.start().await.expect("start");
        handle.cancel();

        let step = handle.resume(0).await.expect("resume after cancel");
        assert!(
            matches!(step, Step::Failed(TaskError::Canceled)),
            "got {step:?}"
        );
        assert_eq!(handle.state(), TaskState::Failed);
    }

    #[tokio::test]
    async fn test_panicking_body_fails_task() {
        let body: SuspendRef<i32, (), i32> =
            SuspendFn::arc("panicker", |_ctx: Suspender<i32, ()>| async move {
                panic!("kaboom");
            });
        let mut handle = TaskHandle::new(body);

        let step = handle.start().await.expect("start");
        assert!(matches!(step, Step::Failed(TaskError::Panicked { .. })));
        assert_eq!(handle.state(), TaskState::Failed);
    }

    #[tokio::test]
    async fn test_state_walk_stays_on_lifecycle_rails() {
        let mut handle = TaskHandle::new(counter_body());
        assert_eq!(handle.state(), TaskState::Created);

        let mut seen = vec![handle.state()];
        let _ = handle.start().await.expect("start");
        seen.push(handle.state());
        while handle.state() == TaskState::Suspended {
            let _ = handle.resume(100).await.expect("resume");
            seen.push(handle.state());
        }

        assert_eq!(
            seen,
            vec![
                TaskState::Created,
                TaskState::Suspended,
                TaskState::Suspended,
                TaskState::Completed,
            ]
        );
    }
}
