//! Hardware abstraction traits for station inputs, outputs, time and storage.
//!
//! This module defines the core hardware interfaces that allow rs-sounder to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`DigitalInput`] | Raw level of a button, line or selector sense input |
//! | [`DigitalOutput`] | Sounder, busy line, lamp and selector scan outputs |
//! | [`SettingsStorage`] | Byte-addressed non-volatile memory (EEPROM style) |
//! | [`Clock`] | Monotonic time source for the main loop |
//!
//! Polarity is not part of the raw pin traits. Wrap a pin in
//! [`DebouncedInput`](crate::input::DebouncedInput) or
//! [`OutputLine`](crate::input::OutputLine) together with an [`ActiveLevel`]
//! to get "pressed"/"on" semantics.
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::traits::{ActiveLevel, DigitalOutput};
//! use rs_sounder::hal::MockOutput;
//!
//! let mut pin = MockOutput::new();
//! pin.set_level(true).unwrap();
//! assert!(pin.is_high());
//!
//! // An active-low lamp is "on" when the pin is driven low
//! assert!(!ActiveLevel::Low.level_for(true));
//! ```

/// Electrical level at which a line counts as active.
///
/// Buttons wired to ground with a pull-up are active low; driver transistors
/// for the sounder and busy outputs are active high.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ActiveLevel {
    /// Active when the pin reads/drives high.
    #[default]
    High,
    /// Active when the pin reads/drives low.
    Low,
}

impl ActiveLevel {
    /// Returns the pin level (`true` = high) that represents `active`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_sounder::traits::ActiveLevel;
    ///
    /// assert!(ActiveLevel::High.level_for(true));
    /// assert!(!ActiveLevel::High.level_for(false));
    /// assert!(!ActiveLevel::Low.level_for(true));
    /// assert!(ActiveLevel::Low.level_for(false));
    /// ```
    #[inline]
    pub const fn level_for(self, active: bool) -> bool {
        match self {
            ActiveLevel::High => active,
            ActiveLevel::Low => !active,
        }
    }

    /// Returns whether a raw pin level counts as active.
    #[inline]
    pub const fn is_active(self, high: bool) -> bool {
        self.level_for(high)
    }
}

/// Raw digital input.
///
/// Reading a configured GPIO cannot fail on the supported targets, so this
/// trait is infallible. Debouncing and polarity live in
/// [`DebouncedInput`](crate::input::DebouncedInput).
pub trait DigitalInput {
    /// Returns true if the pin currently reads high.
    fn is_high(&mut self) -> bool;
}

/// Raw digital output.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_sounder::traits::DigitalOutput;
///
/// struct MyPin { /* hardware handle */ }
///
/// impl DigitalOutput for MyPin {
///     type Error = ();
///
///     fn set_level(&mut self, high: bool) -> Result<(), ()> {
///         // Write the GPIO...
///         Ok(())
///     }
/// }
/// ```
pub trait DigitalOutput {
    /// Error type for output operations.
    type Error;

    /// Drive the pin high (`true`) or low (`false`).
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;
}

/// Byte-addressed non-volatile storage.
///
/// Models an EEPROM: single bytes are read and written by offset. Writes
/// should skip the physical write when the stored byte already matches
/// (the "update" semantics of AVR EEPROM) to save wear, but callers do not
/// depend on it.
pub trait SettingsStorage {
    /// Error type for storage operations.
    type Error;

    /// Read the byte at `offset`.
    fn read(&mut self, offset: usize) -> Result<u8, Self::Error>;

    /// Write `value` at `offset`.
    fn write(&mut self, offset: usize, value: u8) -> Result<(), Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds. The library itself never reads
/// a clock; the main loop samples one and passes `now_ms` into
/// [`Station::tick`](crate::Station::tick).
///
/// # Example
///
/// ```rust
/// use rs_sounder::traits::Clock;
/// use rs_sounder::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}
