//! Trait definitions for hardware abstraction.
//!
//! This module defines the core abstractions that allow rs-sounder to run
//! on different hardware (ESP32, desktop mock).
//!
//! # Hardware Abstraction
//!
//! The key hardware traits are:
//!
//! - [`DigitalInput`]: Buttons, the busy/stop lines and the selector sense line
//! - [`DigitalOutput`]: Sounder, busy output, busy lamp, selector scan lines
//! - [`SettingsStorage`]: EEPROM-style byte storage for the station record
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;

pub use hardware::*;
