//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware traits, enabling
//! development and testing on desktop without a station board.
//!
//! The pin and storage mocks are cheap handles around shared cells: clone a
//! mock before handing it to a [`Station`](crate::Station) and keep the clone
//! to drive inputs or inspect outputs from the test.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockInput`] | [`DigitalInput`] | Settable input level |
//! | [`MockOutput`] | [`DigitalOutput`] | Records level and change count |
//! | [`MockEeprom`] | [`SettingsStorage`] | In-memory byte storage |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::hal::{MockInput, MockOutput};
//! use rs_sounder::traits::{DigitalInput, DigitalOutput};
//!
//! let input = MockInput::new();
//! let mut handle = input.clone();
//! input.set_high(true);
//! assert!(handle.is_high());
//!
//! let output = MockOutput::new();
//! let mut pin = output.clone();
//! pin.set_level(true).unwrap();
//! assert!(output.is_high());
//! assert_eq!(output.changes(), 1);
//! ```
//!
//! [`DigitalInput`]: crate::traits::DigitalInput
//! [`DigitalOutput`]: crate::traits::DigitalOutput
//! [`SettingsStorage`]: crate::traits::SettingsStorage
//! [`Clock`]: crate::traits::Clock

extern crate alloc;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::traits::{Clock, DigitalInput, DigitalOutput, SettingsStorage};

// ============================================================================
// Pin Mocks
// ============================================================================

/// Mock digital input.
///
/// Clones share the same level, so a test keeps one handle and gives the
/// other to the code under test.
#[derive(Clone, Debug, Default)]
pub struct MockInput {
    level: Rc<Cell<bool>>,
}

impl MockInput {
    /// Creates a new mock input reading low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock input with the given initial level.
    pub fn with_level(high: bool) -> Self {
        let input = Self::new();
        input.set_high(high);
        input
    }

    /// Sets the level the input reads.
    pub fn set_high(&self, high: bool) {
        self.level.set(high);
    }

    /// Returns the current level without going through the trait.
    pub fn level(&self) -> bool {
        self.level.get()
    }
}

impl DigitalInput for MockInput {
    fn is_high(&mut self) -> bool {
        self.level.get()
    }
}

/// Mock digital output.
///
/// Records the last driven level and how many times the level changed.
/// Set [`fail`](Self::set_fail) to make writes return `Err(())`.
///
/// # Example
///
/// ```rust
/// use rs_sounder::hal::MockOutput;
/// use rs_sounder::traits::DigitalOutput;
///
/// let probe = MockOutput::new();
/// let mut pin = probe.clone();
///
/// pin.set_level(true).unwrap();
/// pin.set_level(true).unwrap();
/// pin.set_level(false).unwrap();
///
/// assert!(!probe.is_high());
/// assert_eq!(probe.changes(), 2);
/// assert_eq!(probe.writes(), 3);
///
/// probe.set_fail(true);
/// assert!(pin.set_level(true).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockOutput {
    level: Rc<Cell<bool>>,
    changes: Rc<Cell<usize>>,
    writes: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl MockOutput {
    /// Creates a new mock output driven low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last driven level.
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    /// Number of times the driven level actually changed.
    pub fn changes(&self) -> usize {
        self.changes.get()
    }

    /// Number of successful `set_level` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl DigitalOutput for MockOutput {
    type Error = ();

    fn set_level(&mut self, high: bool) -> Result<(), ()> {
        if self.fail.get() {
            return Err(());
        }
        if self.level.get() != high {
            self.changes.set(self.changes.get() + 1);
        }
        self.level.set(high);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

// ============================================================================
// Storage Mock
// ============================================================================

/// Mock EEPROM for testing settings persistence.
///
/// Erased cells read `0xFF`, like a fresh AVR EEPROM. Reads and writes past
/// the end fail with `Err(())`, as do all writes while
/// [`set_write_fail`](Self::set_write_fail) is on.
///
/// # Example
///
/// ```rust
/// use rs_sounder::hal::MockEeprom;
/// use rs_sounder::traits::SettingsStorage;
///
/// let probe = MockEeprom::new(4);
/// let mut eeprom = probe.clone();
///
/// assert_eq!(eeprom.read(0).unwrap(), 0xFF);
/// eeprom.write(1, 0x42).unwrap();
/// assert_eq!(probe.bytes(), vec![0xFF, 0x42, 0xFF, 0xFF]);
/// assert!(eeprom.read(4).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct MockEeprom {
    cells: Rc<RefCell<Vec<u8>>>,
    writes: Rc<Cell<usize>>,
    fail: Rc<Cell<bool>>,
}

impl MockEeprom {
    /// Creates an erased EEPROM of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            cells: Rc::new(RefCell::new(vec![0xFF; size])),
            writes: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    /// Creates an EEPROM preloaded with `bytes`.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        Self {
            cells: Rc::new(RefCell::new(bytes.to_vec())),
            writes: Rc::new(Cell::new(0)),
            fail: Rc::new(Cell::new(false)),
        }
    }

    /// Snapshot of the stored bytes.
    pub fn bytes(&self) -> Vec<u8> {
        self.cells.borrow().clone()
    }

    /// Overwrite a single byte directly (bypasses the write counter).
    pub fn poke(&self, offset: usize, value: u8) {
        if let Some(cell) = self.cells.borrow_mut().get_mut(offset) {
            *cell = value;
        }
    }

    /// Number of physical byte writes performed through the trait.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent writes fail (or succeed again). Reads still work.
    pub fn set_write_fail(&self, fail: bool) {
        self.fail.set(fail);
    }
}

impl SettingsStorage for MockEeprom {
    type Error = ();

    fn read(&mut self, offset: usize) -> Result<u8, ()> {
        self.cells.borrow().get(offset).copied().ok_or(())
    }

    fn write(&mut self, offset: usize, value: u8) -> Result<(), ()> {
        if self.fail.get() {
            return Err(());
        }
        let mut cells = self.cells.borrow_mut();
        let cell = cells.get_mut(offset).ok_or(())?;
        // EEPROM "update": only touch the cell when the value differs
        if *cell != value {
            *cell = value;
            self.writes.set(self.writes.get() + 1);
        }
        Ok(())
    }
}

// ============================================================================
// Clock Mock
// ============================================================================

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use rs_sounder::hal::MockClock;
/// use rs_sounder::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self { current_ms: 0 }
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

// ============================================================================
// Tests
// ============================================================================
