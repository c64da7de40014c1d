//! Desktop clock backed by `std::time::Instant`.

use crate::traits::Clock;
use std::time::Instant;

/// Monotonic clock measuring milliseconds since construction.
///
/// # Example
///
/// ```rust
/// use rs_sounder::hal::StdClock;
/// use rs_sounder::traits::Clock;
///
/// let clock = StdClock::new();
/// let start = clock.now_ms();
/// assert!(clock.now_ms() >= start);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: Instant,
}

impl StdClock {
    /// Creates a clock whose epoch is now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_clock_is_monotonic() {
        let clock = StdClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
