//! Error types used by the coflow primitives.
//!
//! This module defines one error enum per component:
//!
//! - [`DriveError`] — errors raised by driving a suspendable task from the outside.
//! - [`TaskError`] — errors raised by (or injected into) a task body.
//! - [`BusError`] — errors raised by event emission on the bus.
//! - [`ChannelError`] — errors raised by channel writes and pipes.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by driving a task.
///
/// These represent misuse of the driver handle itself, such as resuming a
/// task that has already completed, not failures of the task body.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DriveError {
    /// The requested operation is not valid in the task's current state.
    #[error("invalid operation for task state '{state}'")]
    InvalidState {
        /// Stable label of the state the task was in (see `TaskState::as_label`).
        state: &'static str,
    },
}

impl DriveError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use coflow::DriveError;
    ///
    /// let err = DriveError::InvalidState { state: "completed" };
    /// assert_eq!(err.as_label(), "drive_invalid_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DriveError::InvalidState { .. } => "drive_invalid_state",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DriveError::InvalidState { state } => {
                format!("operation rejected: task is '{state}'")
            }
        }
    }
}

/// # Errors produced by (or injected into) a task body.
///
/// A `TaskError` that propagates out of the body becomes the task's terminal
/// `Failed` result. It never escalates to a process-wide fault; the driver
/// decides whether `Failed` is fatal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed, or the driver injected this error at a suspension point.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task was cancelled via its cancellation token at a suspension point.
    #[error("cancelled at suspension point")]
    Canceled,

    /// Task body panicked; the panic was caught at the spawn boundary.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Rendered panic/join information.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] with the given message.
    ///
    /// # Example
    /// ```
    /// use coflow::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "cancelled".to_string(),
            TaskError::Panicked { reason } => format!("panic: {reason}"),
        }
    }
}

/// # Errors produced by event emission.
///
/// Emission is fully synchronous, so both variants surface directly to the
/// `emit` caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// The reserved `"error"` event was emitted with zero registered listeners.
    ///
    /// Every other event name is a silent no-op when unlistened; `"error"`
    /// alone escalates, so faults cannot vanish unobserved.
    #[error("unhandled 'error' event: {detail}")]
    UnhandledError {
        /// Rendered payload of the unhandled emission.
        detail: String,
    },

    /// A listener returned an error during emission.
    ///
    /// Remaining listeners in the same emission are skipped (see
    /// [`EventBus::emit`](crate::EventBus::emit)).
    #[error("listener failed on '{event}': {error}")]
    ListenerFailed {
        /// Name of the event being emitted.
        event: String,
        /// The error returned by the listener.
        error: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use coflow::BusError;
    ///
    /// let err = BusError::UnhandledError { detail: "42".into() };
    /// assert_eq!(err.as_label(), "bus_unhandled_error");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::UnhandledError { .. } => "bus_unhandled_error",
            BusError::ListenerFailed { .. } => "bus_listener_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::UnhandledError { detail } => format!("unhandled error event: {detail}"),
            BusError::ListenerFailed { event, error } => {
                format!("listener on '{event}' failed: {error}")
            }
        }
    }
}

/// # Errors produced by channel writes and pipes.
///
/// Pipe errors surface to the `pipe_to` caller without corrupting the state
/// of either channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Write attempted after `close()`.
    #[error("channel is closed")]
    Closed,

    /// Write attempted while the channel was blocked and the channel is
    /// configured with [`OverflowPolicy::Reject`](crate::OverflowPolicy::Reject).
    #[error("write while blocked; wait for the drained signal")]
    BackpressureViolation,
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use coflow::ChannelError;
    ///
    /// assert_eq!(ChannelError::Closed.as_label(), "channel_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::Closed => "channel_closed",
            ChannelError::BackpressureViolation => "channel_backpressure_violation",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ChannelError::Closed => "write rejected: channel closed".to_string(),
            ChannelError::BackpressureViolation => {
                "write rejected: channel blocked (strict overflow policy)".to_string()
            }
        }
    }
}
