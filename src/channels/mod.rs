//! Flow-controlled channels: bounded FIFO conduits with explicit backpressure.
//!
//! This module groups the channel **data path** and its composition helpers:
//! - [`Channel`], [`WriteOutcome`], [`ReadOutcome`], [`ChannelState`] — the
//!   conduit itself
//! - [`ChannelConfig`], [`OverflowPolicy`] — capacity, low-water mark, and
//!   strict-mode knobs
//! - `pipe_to` / `transform` / `into_stream` — backpressure-preserving
//!   composition (see [`Channel`] methods)
//!
//! ## Quick wiring
//! ```text
//! producer ── write() ──► [ buffer | capacity ] ── read()/recv() ──► consumer
//!                │                    │
//!                │  backpressure=true once len >= capacity
//!                ◄────────────────────┘
//!                      on_drained() fires when len falls to low_water
//!
//! source.pipe_to(&dest):    pause on dest backpressure, resume on drained,
//!                           close dest at end-of-stream
//! source.transform(f):      mapped stage; a blocked output stalls the pump,
//!                           which backpressures the original producer
//! ```

mod channel;
mod config;
mod pipe;
mod stream;
mod transform;

pub use channel::{Channel, ChannelState, ReadOutcome, WriteOutcome};
pub use config::{ChannelConfig, OverflowPolicy};
