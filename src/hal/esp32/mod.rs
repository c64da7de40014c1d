//! ESP32 station board hardware abstraction layer.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-DevKitC (dual core Xtensa, 4MB Flash)
//! - **Sounder / busy line**: logic-level MOSFET drivers, active high
//! - **Busy lamp**: LED to 3.3V, active low
//! - **Buttons and lines**: switched to ground with internal pull-ups
//! - **Train selector**: 8 position rotary switch, scanned
//!
//! # Pin Assignments
//!
//! See the [`pins`] module for GPIO assignments.

mod clock;
mod gpio;
mod nvs;

pub use clock::Esp32Clock;
pub use gpio::{Esp32Input, Esp32Output};
pub use nvs::{Esp32Eeprom, NvsEepromError, EEPROM_SIZE};

/// Pin assignments for the ESP32-DevKitC station board.
pub mod pins {
    // =========================================================================
    // Outputs
    // =========================================================================

    /// Sounder driver
    pub const SOUNDER: i32 = 25;

    /// Busy line output to the other stations
    pub const BUSY_OUT: i32 = 26;

    /// Busy lamp (active low)
    pub const BUSY_LAMP: i32 = 27;

    // =========================================================================
    // Inputs (active low, pulled up)
    // =========================================================================

    /// "Regular" train button
    pub const REGULAR: i32 = 32;

    /// "Extra" train button
    pub const EXTRA: i32 = 33;

    /// Dispatcher stop line
    pub const STOP: i32 = 13;

    /// Busy line input from the other stations
    pub const BUSY_IN: i32 = 14;

    // =========================================================================
    // Train Selector
    // =========================================================================

    /// Selector common contact
    pub const SELECTOR_SENSE: i32 = 4;

    /// Selector scan outputs, position 1 first
    pub const SELECTOR_SCAN: [i32; 8] = [16, 17, 18, 19, 21, 22, 23, 5];
}
