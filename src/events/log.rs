//! # Simple logging listener for debugging and demos.
//!
//! [`stdout_listener`] builds a bus listener that prints payloads to stdout
//! in a human-readable format. This is primarily useful for development,
//! debugging, and the bundled demos.
//!
//! ## Output format
//! ```text
//! [tick] payload=3
//! [error] payload="disk full"
//! ```

use std::fmt;

/// Builds a stdout-printing listener tagged with `tag`.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// register a custom listener for structured logging or metrics collection.
///
/// ## Example
/// ```
/// use coflow::{stdout_listener, EventBus};
///
/// let bus: EventBus<u32> = EventBus::new();
/// bus.on("tick", stdout_listener("tick"));
/// bus.emit("tick", &3).unwrap();
/// ```
pub fn stdout_listener<T: fmt::Debug>(
    tag: &'static str,
) -> impl Fn(&T) -> Result<(), String> + Send + Sync + 'static {
    move |payload: &T| {
        println!("[{tag}] payload={payload:?}");
        Ok(())
    }
}
