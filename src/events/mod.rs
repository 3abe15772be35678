//! Synchronous event registry: named events, ordered listeners, explicit deferral.
//!
//! This module groups the event **registry** and the host-scheduler
//! **deferral** capability:
//! - [`EventBus`], [`SubscriptionId`], [`BusConfig`] — registration-ordered
//!   synchronous pub/sub
//! - [`defer_after_current_turn`] — run a callback after the current
//!   synchronous turn, as an explicit scheduler capability (never implicit
//!   inside the bus)
//!
//! ## Quick reference
//! - `emit` is fully synchronous: it does not return until every invoked
//!   listener has run (or one has failed).
//! - The reserved [`ERROR_EVENT`] name escalates when unlistened; every other
//!   name is a silent no-op.

mod bus;
mod defer;
#[cfg(feature = "logging")]
mod log;

pub use bus::{BusConfig, EventBus, SubscriptionId, ERROR_EVENT};
pub use defer::defer_after_current_turn;
#[cfg(feature = "logging")]
pub use log::stdout_listener;
