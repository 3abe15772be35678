//! # Channel configuration.
//!
//! Provides [`ChannelConfig`], the per-channel flow-control settings, and
//! [`OverflowPolicy`], the strict-mode knob for writes issued while blocked.
//!
//! ## Sentinel values
//! - `capacity = 0` → treated as 1 (a channel always admits one item)
//! - `low_water >= capacity` → clamped to `capacity - 1` (the drained signal
//!   requires an actual drain below the threshold)

/// Policy for writes issued while the channel is blocked.
///
/// Both behaviors are supported; the active one is always explicit in the
/// config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Silently queue the item. The buffer may grow past `capacity`; the
    /// channel keeps reporting backpressure until drained. Default.
    #[default]
    Queue,

    /// Reject the write with
    /// [`ChannelError::BackpressureViolation`](crate::ChannelError::BackpressureViolation).
    /// Use when a producer ignoring the drained signal is a bug worth
    /// surfacing.
    Reject,
}

/// Flow-control configuration for a [`Channel`](crate::Channel).
///
/// ## Field semantics
/// - `capacity`: buffer length at which writes start reporting
///   `backpressure = true` (min 1; clamped by the channel)
/// - `low_water`: buffer length at or below which a blocked channel unblocks
///   and fires its drained hooks (clamped below `capacity`)
/// - `overflow`: what happens to writes issued while blocked
#[derive(Clone, Copy, Debug)]
pub struct ChannelConfig {
    /// Backpressure threshold.
    pub capacity: usize,
    /// Drain threshold for the drained signal.
    pub low_water: usize,
    /// Behavior of writes issued while blocked.
    pub overflow: OverflowPolicy,
}

impl Default for ChannelConfig {
    /// Returns a config with:
    /// - `capacity = 16`
    /// - `low_water = 8`
    /// - `overflow = OverflowPolicy::Queue`
    fn default() -> Self {
        Self {
            capacity: 16,
            low_water: 8,
            overflow: OverflowPolicy::Queue,
        }
    }
}

impl ChannelConfig {
    /// Creates a config with the given capacity, a low-water mark at half of
    /// it, and the default overflow policy.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            low_water: capacity / 2,
            overflow: OverflowPolicy::default(),
        }
    }

    /// Returns the capacity clamped to a minimum of 1.
    ///
    /// The channel uses this value so a zero-capacity config cannot wedge
    /// every write.
    #[inline]
    pub fn capacity_clamped(&self) -> usize {
        self.capacity.max(1)
    }

    /// Returns the low-water mark clamped below the effective capacity.
    #[inline]
    pub fn low_water_clamped(&self) -> usize {
        self.low_water.min(self.capacity_clamped() - 1)
    }
}
