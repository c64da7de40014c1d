//! # rs-sounder
//!
//! A telegraph sounder controller for model railroad stations.
//!
//! Each station board clicks railroad dot code through a sounder, reports
//! trains to the dispatcher at the press of a button, shows when another
//! station holds the shared busy line, and (on one station) plays period
//! chatter now and then.
//!
//! ## Features
//!
//! - **Dot code player**: greedy text encoder with abbreviations, punctuation
//!   and silence markers, played against a tick clock without blocking
//! - **Hierarchical modes**: a small delegate-to-parent state machine engine
//!   drives idle, busy, sounding, setup and ambiance modes
//! - **Setup with persistence**: station identity chosen with the train
//!   selector and stored in a CRC-protected record
//! - **Hardware abstraction**: pins, storage and time behind traits, with
//!   mocks for desktop tests and ESP32 bindings behind a feature
//!
//! ## Architecture
//!
//! - `traits` - Hardware abstractions
//! - `timer`, `input`, `selector` - Tick-polled input and timing primitives
//! - `settings` - Checksummed station settings record
//! - `dot_code` - Encoder and non-blocking player
//! - `hsm` - Generic hierarchical state machine engine
//! - `station` - The station mode chart and main loop
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_sounder::{config::TimingConfig, dot_code::DotCodePlayer};
//!
//! let mut player = DotCodePlayer::new(TimingConfig::default());
//! player.start("SOS", 0);
//!
//! // Main loop: poll every millisecond and drive the sounder
//! let mut clicks = 0;
//! let mut was_on = false;
//! for now in 0..10_000 {
//!     let done = player.poll(now);
//!     if player.is_active() && !was_on {
//!         clicks += 1;
//!     }
//!     was_on = player.is_active();
//!     if done {
//!         break;
//!     }
//! }
//! assert_eq!(clicks, 4 + 3 + 4);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Shared configuration system for desktop and ESP32.
pub mod config;
/// Railroad dot code encoder and player.
pub mod dot_code;
/// Station error type.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Hierarchical state machine engine.
pub mod hsm;
/// Debounced inputs and polarity-aware outputs.
pub mod input;
/// Multiplexed rotary train selector.
pub mod selector;
/// Checksum-protected persistent settings.
pub mod settings;
/// Station mode chart and control loop.
pub mod station;
/// One-shot deadline timers.
pub mod timer;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::Config;
pub use dot_code::{DotCodePlayer, PlaybackState};
pub use error::StationError;
pub use settings::{SettingsStore, StationSettings};
pub use station::{Signal, Station, StationMode, StationPins, StationStatus};
pub use timer::{Timer, TimerId};
pub use traits::{ActiveLevel, Clock, DigitalInput, DigitalOutput, SettingsStorage};
