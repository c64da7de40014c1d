//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `desktop`: `std` clock for the desktop simulator (requires `std` feature)
//! - `esp32`: ESP32 station board (requires `esp32` feature)

pub mod mock;

#[cfg(feature = "std")]
pub mod desktop;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "std")]
pub use desktop::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
