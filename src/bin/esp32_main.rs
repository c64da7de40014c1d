//! ESP32 telegraph station firmware.
//!
//! This is the main entry point for the station board. It wires the board
//! pins into a [`Station`] and ticks it as fast as the scheduler allows:
//! - Scans the train selector and debounces the buttons and lines
//! - Sequences idle, busy, sounding, setup and ambiance modes
//! - Clicks dot code on the sounder
//! - Stores the station identity in NVS
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/xtensa-esp32-espidf/release/esp32_main
//! ```

use esp_idf_hal::gpio::{IOPin, OutputPin};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::log::EspLogger;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rs_sounder::hal::esp32::{pins as board, Esp32Clock, Esp32Eeprom, Esp32Input, Esp32Output};
use rs_sounder::traits::Clock;
use rs_sounder::{Config, Station, StationPins};
use std::thread;
use std::time::Duration;

/// Pause between ticks; short enough to keep pulse edges within a millisecond
/// or two while still yielding to the idle task.
const LOOP_INTERVAL_MS: u64 = 1;

/// Log a status line every this many milliseconds.
const STATUS_INTERVAL_MS: u64 = 10_000;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    EspLogger::initialize_default();

    info!("================================");
    info!("  rs-sounder station");
    info!("================================");

    let config = Config::default();
    let wiring = config.wiring;

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // =========================================================================
    // Outputs
    // =========================================================================
    let sounder = Esp32Output::new(pins.gpio25.downgrade_output())?;
    let busy_out = Esp32Output::new(pins.gpio26.downgrade_output())?;
    let busy_lamp = Esp32Output::new(pins.gpio27.downgrade_output())?;
    info!(
        "[OK] Outputs (sounder GPIO{}, busy GPIO{}, lamp GPIO{})",
        board::SOUNDER,
        board::BUSY_OUT,
        board::BUSY_LAMP
    );

    // =========================================================================
    // Inputs
    // =========================================================================
    let regular = Esp32Input::new(pins.gpio32.downgrade(), wiring.regular)?;
    let extra = Esp32Input::new(pins.gpio33.downgrade(), wiring.extra)?;
    let stop = Esp32Input::new(pins.gpio13.downgrade(), wiring.stop)?;
    let busy_in = Esp32Input::new(pins.gpio14.downgrade(), wiring.busy_in)?;
    info!(
        "[OK] Inputs (regular GPIO{}, extra GPIO{}, stop GPIO{}, busy GPIO{})",
        board::REGULAR,
        board::EXTRA,
        board::STOP,
        board::BUSY_IN
    );

    // =========================================================================
    // Train Selector
    // =========================================================================
    let selector_sense = Esp32Input::new(pins.gpio4.downgrade(), wiring.selector_sense)?;
    let scan_pins = [
        pins.gpio16.downgrade_output(),
        pins.gpio17.downgrade_output(),
        pins.gpio18.downgrade_output(),
        pins.gpio19.downgrade_output(),
        pins.gpio21.downgrade_output(),
        pins.gpio22.downgrade_output(),
        pins.gpio23.downgrade_output(),
        pins.gpio5.downgrade_output(),
    ];
    let mut selector_scan = heapless::Vec::new();
    for pin in scan_pins {
        selector_scan
            .push(Esp32Output::new(pin)?)
            .map_err(|_| anyhow::anyhow!("too many selector positions"))?;
    }
    info!(
        "[OK] Train selector (sense GPIO{}, scan {:?})",
        board::SELECTOR_SENSE,
        &board::SELECTOR_SCAN[..selector_scan.len()]
    );

    // =========================================================================
    // Settings, Randomness, Clock
    // =========================================================================
    let eeprom = Esp32Eeprom::new(EspDefaultNvsPartition::take()?)?;
    let seed = unsafe { esp_idf_hal::sys::esp_random() } as u64;
    let rng = SmallRng::seed_from_u64(seed);
    let clock = Esp32Clock::new();

    let station_pins = StationPins {
        sounder,
        busy_out,
        busy_lamp,
        regular,
        extra,
        stop,
        busy_in,
        selector_sense,
        selector_scan,
    };
    let mut station = Station::new(station_pins, config, eeprom, rng, clock.now_ms())?;
    info!("[OK] Station up in {:?}", station.mode());

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    let mut last_status = clock.now_ms();
    loop {
        let now = clock.now_ms();

        if let Err(e) = station.tick(now) {
            error!("tick failed: {}", e);
        }

        if now.saturating_sub(last_status) >= STATUS_INTERVAL_MS {
            last_status = now;
            info!("{:?}", station.status());
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
