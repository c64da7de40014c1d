//! Single-shot deadline timers.
//!
//! A [`Timer`] holds at most one pending deadline. It is polled once per tick
//! with the tick's timestamp and reports expiry exactly once.
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::timer::Timer;
//!
//! let mut timer = Timer::new();
//! timer.arm(500, 1_000);
//!
//! assert!(!timer.poll(1_499));
//! assert!(timer.poll(1_500)); // fires once
//! assert!(!timer.poll(1_501));
//! assert!(!timer.is_armed());
//! ```

/// Identifies the two station timers in
/// [`Signal::Timeout`](crate::station::Signal::Timeout).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimerId {
    /// Schedules the next ambiance message.
    Ambiance,
    /// Blinks the busy lamp.
    Lamp,
}

/// One-shot timer compared against the tick clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    /// `(armed_at_ms, duration_ms)` while a deadline is pending.
    pending: Option<(u64, u64)>,
}

impl Timer {
    /// Creates a disarmed timer.
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Arm the timer to expire `duration_ms` after `now_ms`.
    ///
    /// Replaces any pending deadline.
    pub fn arm(&mut self, duration_ms: u64, now_ms: u64) {
        self.pending = Some((now_ms, duration_ms));
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Returns true while a deadline is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds until expiry, or `None` when disarmed.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.pending
            .map(|(armed_at, duration)| duration.saturating_sub(now_ms.saturating_sub(armed_at)))
    }

    /// Returns true exactly once, on the first poll at or after the deadline.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.pending {
            Some((armed_at, duration)) if now_ms.saturating_sub(armed_at) >= duration => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
