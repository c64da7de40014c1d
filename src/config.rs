//! Station configuration shared by desktop and ESP32 builds.
//!
//! Uses `heapless` strings and vectors for `no_std` compatibility while
//! remaining ergonomic to use on desktop with `std`. Every default is the
//! value the station firmware has always shipped with.
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::config::{Config, StationConfig, TimingConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.timing.pulse_ms, 50);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_timing(TimingConfig::default().with_pulse_ms(40))
//!     .with_station(StationConfig::default().with_names(&["FA", "AQ"]));
//! assert_eq!(config.station.station_count(), 2);
//! ```

use heapless::String as HString;
use heapless::Vec;

use crate::traits::ActiveLevel;

/// Maximum length for short config strings (station names, train labels)
pub const MAX_SHORT_STRING: usize = 16;

/// Maximum number of stations on the line
pub const MAX_STATIONS: usize = 16;

/// Maximum number of train selector positions
pub const MAX_TRAIN_LABELS: usize = crate::selector::MAX_SELECTOR_POSITIONS;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let _ = hs.push_str(truncate_to(s, MAX_SHORT_STRING));
    hs
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub fn truncate_to(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn string_list<const N: usize>(items: &[&str]) -> Vec<ShortString, N> {
    items.iter().take(N).map(|s| short_string(s)).collect()
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete station configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Dot code pulse timing
    pub timing: TimingConfig,
    /// Input sampling
    pub input: InputConfig,
    /// Station identity and line layout
    pub station: StationConfig,
    /// Ambiance chatter scheduling
    pub ambiance: AmbianceConfig,
    /// Electrical polarity of every line
    pub wiring: WiringConfig,
}

impl Config {
    /// Set timing configuration
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Set input configuration
    pub fn with_input(mut self, input: InputConfig) -> Self {
        self.input = input;
        self
    }

    /// Set station configuration
    pub fn with_station(mut self, station: StationConfig) -> Self {
        self.station = station;
        self
    }

    /// Set ambiance configuration
    pub fn with_ambiance(mut self, ambiance: AmbianceConfig) -> Self {
        self.ambiance = ambiance;
        self
    }

    /// Set line polarities
    pub fn with_wiring(mut self, wiring: WiringConfig) -> Self {
        self.wiring = wiring;
        self
    }
}

// ============================================================================
// Timing Config
// ============================================================================

/// Dot code timing.
///
/// One pulse "unit" is a pulse plus the gap after it. Digit groups inside a
/// codeword are separated by 4 units, codewords by 8 units.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimingConfig {
    /// Sounder on-time for one pulse
    pub pulse_ms: u32,
    /// Silence between pulses of the same digit
    pub pulse_gap_ms: u32,
    /// Silence before the first codeword of a telegram
    pub lead_in_ms: u32,
    /// Silence played for each `~` marker
    pub silence_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 50,
            pulse_gap_ms: 100,
            lead_in_ms: 500,
            silence_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Set the pulse duration
    pub fn with_pulse_ms(mut self, ms: u32) -> Self {
        self.pulse_ms = ms;
        self
    }

    /// Set the gap between pulses of one digit
    pub fn with_pulse_gap_ms(mut self, ms: u32) -> Self {
        self.pulse_gap_ms = ms;
        self
    }

    /// Set the lead-in silence
    pub fn with_lead_in_ms(mut self, ms: u32) -> Self {
        self.lead_in_ms = ms;
        self
    }

    /// Set the `~` silence
    pub fn with_silence_ms(mut self, ms: u32) -> Self {
        self.silence_ms = ms;
        self
    }

    /// Pause between the digit groups of one codeword.
    pub fn group_gap_ms(&self) -> u32 {
        4 * (self.pulse_ms + self.pulse_gap_ms)
    }

    /// Pause after the last digit of a codeword.
    pub fn symbol_gap_ms(&self) -> u32 {
        8 * (self.pulse_ms + self.pulse_gap_ms)
    }
}

// ============================================================================
// Input Config
// ============================================================================

/// Input sampling configuration
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputConfig {
    /// A button or line level must hold this long to count
    pub debounce_ms: u32,
    /// Dwell time on each selector scan output
    pub scan_dwell_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            debounce_ms: crate::input::DEFAULT_DEBOUNCE_MS as u32,
            scan_dwell_ms: crate::selector::DEFAULT_SCAN_DWELL_MS as u32,
        }
    }
}

impl InputConfig {
    /// Set the debounce window
    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Set the selector dwell time
    pub fn with_scan_dwell_ms(mut self, ms: u32) -> Self {
        self.scan_dwell_ms = ms;
        self
    }
}

// ============================================================================
// Station Config
// ============================================================================

/// Station names, selector labels and busy lamp timing
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationConfig {
    /// Station call letters, indexed by station number
    pub names: Vec<ShortString, MAX_STATIONS>,
    /// Train number for each selector position
    pub train_labels: Vec<ShortString, MAX_TRAIN_LABELS>,
    /// Station whose sounder plays ambiance chatter
    pub ambiance_station: u8,
    /// Busy lamp on/off period
    pub lamp_blink_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            names: string_list(&["DS", "AQ", "BK", "PC", "ST", "FA"]),
            train_labels: string_list(&["1", "2", "3", "4", "5", "6", "7", "8"]),
            ambiance_station: 0,
            lamp_blink_ms: 500,
        }
    }
}

impl StationConfig {
    /// Set the station names (extra entries beyond [`MAX_STATIONS`] are dropped)
    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = string_list(names);
        self
    }

    /// Set the selector labels
    pub fn with_train_labels(mut self, labels: &[&str]) -> Self {
        self.train_labels = string_list(labels);
        self
    }

    /// Set which station plays ambiance chatter
    pub fn with_ambiance_station(mut self, station: u8) -> Self {
        self.ambiance_station = station;
        self
    }

    /// Set the busy lamp blink period
    pub fn with_lamp_blink_ms(mut self, ms: u32) -> Self {
        self.lamp_blink_ms = ms;
        self
    }

    /// Number of known stations
    pub fn station_count(&self) -> usize {
        self.names.len()
    }

    /// Name of station `index`, if it exists
    pub fn station_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|n| n.as_str())
    }
}

// ============================================================================
// Ambiance Config
// ============================================================================

/// Ambiance chatter scheduling
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmbianceConfig {
    /// Minimum delay before the next ambiance message
    pub base_delay_ms: u32,
    /// Uniform random delay added to the base
    pub random_variance_ms: u32,
    /// Delay after returning to idle when a message came due while busy
    pub retry_delay_ms: u32,
}

impl Default for AmbianceConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 5 * 60 * 1000,
            random_variance_ms: 10 * 60 * 1000,
            retry_delay_ms: 30_000,
        }
    }
}

impl AmbianceConfig {
    /// Set the base delay
    pub fn with_base_delay_ms(mut self, ms: u32) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set the random variance
    pub fn with_random_variance_ms(mut self, ms: u32) -> Self {
        self.random_variance_ms = ms;
        self
    }

    /// Set the retry delay
    pub fn with_retry_delay_ms(mut self, ms: u32) -> Self {
        self.retry_delay_ms = ms;
        self
    }
}

// ============================================================================
// Wiring Config
// ============================================================================

/// Active level of each station line.
///
/// Defaults match the station board: driver transistors on the sounder and
/// busy outputs, an active-low busy lamp, and pulled-up inputs switched to
/// ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WiringConfig {
    /// Sounder driver
    pub sounder: ActiveLevel,
    /// Busy line output to the other stations
    pub busy_out: ActiveLevel,
    /// Busy lamp on the station panel
    pub busy_lamp: ActiveLevel,
    /// "Regular" train button
    pub regular: ActiveLevel,
    /// "Extra" train button
    pub extra: ActiveLevel,
    /// Dispatcher stop line
    pub stop: ActiveLevel,
    /// Busy line input from the other stations
    pub busy_in: ActiveLevel,
    /// Selector common contact
    pub selector_sense: ActiveLevel,
    /// Selector scan outputs
    pub selector_scan: ActiveLevel,
}

impl Default for WiringConfig {
    fn default() -> Self {
        Self {
            sounder: ActiveLevel::High,
            busy_out: ActiveLevel::High,
            busy_lamp: ActiveLevel::Low,
            regular: ActiveLevel::Low,
            extra: ActiveLevel::Low,
            stop: ActiveLevel::Low,
            busy_in: ActiveLevel::Low,
            selector_sense: ActiveLevel::Low,
            selector_scan: ActiveLevel::Low,
        }
    }
}

impl WiringConfig {
    /// Every line active high (handy for simulation)
    pub fn all_active_high() -> Self {
        Self {
            sounder: ActiveLevel::High,
            busy_out: ActiveLevel::High,
            busy_lamp: ActiveLevel::High,
            regular: ActiveLevel::High,
            extra: ActiveLevel::High,
            stop: ActiveLevel::High,
            busy_in: ActiveLevel::High,
            selector_sense: ActiveLevel::High,
            selector_scan: ActiveLevel::High,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.input.debounce_ms, 10);
        assert_eq!(config.input.scan_dwell_ms, 10);
        assert_eq!(config.station.ambiance_station, 0);
        assert_eq!(config.station.lamp_blink_ms, 500);
    }

    #[test]
    fn default_timing_matches_firmware() {
        let timing = TimingConfig::default();
        assert_eq!(timing.pulse_ms, 50);
        assert_eq!(timing.pulse_gap_ms, 100);
        assert_eq!(timing.lead_in_ms, 500);
        assert_eq!(timing.silence_ms, 1000);
        assert_eq!(timing.group_gap_ms(), 600);
        assert_eq!(timing.symbol_gap_ms(), 1200);
    }

    #[test]
    fn timing_builders() {
        let timing = TimingConfig::default()
            .with_pulse_ms(10)
            .with_pulse_gap_ms(20)
            .with_lead_in_ms(30)
            .with_silence_ms(40);
        assert_eq!(timing.pulse_ms, 10);
        assert_eq!(timing.pulse_gap_ms, 20);
        assert_eq!(timing.lead_in_ms, 30);
        assert_eq!(timing.silence_ms, 40);
        assert_eq!(timing.group_gap_ms(), 120);
        assert_eq!(timing.symbol_gap_ms(), 240);
    }

    #[test]
    fn default_ambiance_window() {
        let ambiance = AmbianceConfig::default();
        assert_eq!(ambiance.base_delay_ms, 300_000);
        assert_eq!(ambiance.random_variance_ms, 600_000);
        assert_eq!(ambiance.retry_delay_ms, 30_000);
    }

    #[test]
    fn ambiance_builders() {
        let ambiance = AmbianceConfig::default()
            .with_base_delay_ms(1)
            .with_random_variance_ms(2)
            .with_retry_delay_ms(3);
        assert_eq!(ambiance.base_delay_ms, 1);
        assert_eq!(ambiance.random_variance_ms, 2);
        assert_eq!(ambiance.retry_delay_ms, 3);
    }

    #[test]
    fn default_stations_and_labels() {
        let station = StationConfig::default();
        assert_eq!(station.station_count(), 6);
        assert_eq!(station.station_name(0), Some("DS"));
        assert_eq!(station.station_name(4), Some("ST"));
        assert_eq!(station.station_name(6), None);
        assert_eq!(station.train_labels.len(), 8);
        assert_eq!(station.train_labels[0].as_str(), "1");
    }

    #[test]
    fn station_builders() {
        let station = StationConfig::default()
            .with_names(&["FA", "AQ", "PC"])
            .with_train_labels(&["10", "11"])
            .with_ambiance_station(2)
            .with_lamp_blink_ms(250);
        assert_eq!(station.station_count(), 3);
        assert_eq!(station.station_name(1), Some("AQ"));
        assert_eq!(station.train_labels.len(), 2);
        assert_eq!(station.ambiance_station, 2);
        assert_eq!(station.lamp_blink_ms, 250);
    }

    #[test]
    fn too_many_names_are_dropped() {
        let names = ["X"; MAX_STATIONS + 4];
        let station = StationConfig::default().with_names(&names);
        assert_eq!(station.station_count(), MAX_STATIONS);
    }

    #[test]
    fn input_builders() {
        let input = InputConfig::default()
            .with_debounce_ms(25)
            .with_scan_dwell_ms(15);
        assert_eq!(input.debounce_ms, 25);
        assert_eq!(input.scan_dwell_ms, 15);
    }

    #[test]
    fn default_wiring_matches_board() {
        let wiring = WiringConfig::default();
        assert_eq!(wiring.sounder, ActiveLevel::High);
        assert_eq!(wiring.busy_out, ActiveLevel::High);
        assert_eq!(wiring.busy_lamp, ActiveLevel::Low);
        assert_eq!(wiring.busy_in, ActiveLevel::Low);
        assert_eq!(wiring.selector_scan, ActiveLevel::Low);

        let config = Config::default().with_wiring(WiringConfig::all_active_high());
        assert_eq!(config.wiring.busy_lamp, ActiveLevel::High);
    }

    #[test]
    fn short_string_truncation() {
        let s = short_string("THIS NAME IS FAR TOO LONG TO FIT");
        assert_eq!(s.len(), MAX_SHORT_STRING);
        assert_eq!(s.as_str(), "THIS NAME IS FAR");
    }

    #[test]
    fn truncate_respects_char_boundary() {
        // 'é' is two bytes; cutting at 2 would split it
        assert_eq!(truncate_to("aé", 2), "a");
        assert_eq!(truncate_to("abc", 10), "abc");
        assert_eq!(truncate_to("abc", 0), "");
    }
}
