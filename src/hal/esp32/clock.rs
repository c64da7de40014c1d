//! Station board time source.

use crate::traits::Clock;

/// Boot-relative milliseconds from the ESP-IDF microsecond timer.
///
/// ```ignore
/// let clock = Esp32Clock::new();
/// station.tick(clock.now_ms())?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// The clock needs no setup; any instance reads the same timer.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32Clock {
    fn now_ms(&self) -> u64 {
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}
