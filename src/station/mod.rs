//! The station controller.
//!
//! [`Station`] owns every input, output and the settings store, and runs the
//! mode chart in [`states`]. Call [`Station::tick`] once per main loop pass
//! with the current time. Each tick:
//!
//! 1. polls the selector and the regular, extra, stop and busy inputs,
//!    turning edges into [`Signal`]s;
//! 2. polls the ambiance and lamp timers;
//! 3. delivers the previous tick's sounder completion, if any;
//! 4. polls the dot code player (completion is delivered next tick);
//! 5. writes the sounder, busy and lamp outputs (while transmitting, the
//!    lamp echoes the sounder);
//! 6. saves settings if setup asked for it.
//!
//! Every signal reaches the chart before the player is polled, so a mode
//! change can cancel or restart playback before the sounder is written.
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::{Config, Station, StationMode, StationPins};
//! use rs_sounder::hal::{MockEeprom, MockInput, MockOutput};
//! use rs_sounder::settings::encode_record;
//! use rand::rngs::mock::StepRng;
//!
//! let regular = MockInput::with_level(true); // active low, released
//! let sounder = MockOutput::new();
//! let pins = StationPins {
//!     sounder: sounder.clone(),
//!     busy_out: MockOutput::new(),
//!     busy_lamp: MockOutput::new(),
//!     regular: regular.clone(),
//!     extra: MockInput::with_level(true),
//!     stop: MockInput::with_level(true),
//!     busy_in: MockInput::with_level(true),
//!     selector_sense: MockInput::with_level(true),
//!     selector_scan: (0..8).map(|_| MockOutput::new()).collect(),
//! };
//! let eeprom = MockEeprom::with_bytes(&encode_record(4));
//!
//! let mut station = Station::new(pins, Config::default(), eeprom, StepRng::new(0, 0), 0).unwrap();
//! assert_eq!(station.mode(), StationMode::Idle);
//!
//! regular.set_high(false); // press
//! for now in 1..=20 {
//!     station.tick(now).unwrap();
//! }
//! assert_eq!(station.mode(), StationMode::Sounding);
//! assert_eq!(station.telegram(), "WWW OS ~ST 1.~~~~");
//! ```

pub mod context;
pub mod states;
pub mod telegram;

use core::fmt::Write;

use heapless::Vec;
use log::{debug, info, warn};
use rand::RngCore;

use crate::config::{Config, ShortString};
use crate::dot_code::DotCodePlayer;
use crate::error::StationError;
use crate::hsm::Machine;
use crate::input::{DebouncedInput, OutputLine};
use crate::selector::{TrainSelector, MAX_SELECTOR_POSITIONS};
use crate::settings::{SettingsStore, StationSettings};
use crate::timer::TimerId;
use crate::traits::{DigitalInput, DigitalOutput, SettingsStorage};

pub use context::StationContext;
pub use states::StationMode;

/// Something the station reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    /// The train selector moved to a new position.
    TrainSelected,
    /// "Regular" button pressed (`true`) or released.
    Regular(bool),
    /// "Extra" button pressed (`true`) or released.
    Extra(bool),
    /// Dispatcher stop line asserted (`true`) or released.
    Stop(bool),
    /// Another station asserted (`true`) or released the busy line.
    Busy(bool),
    /// A station timer expired.
    Timeout(TimerId),
    /// The player finished its telegram on its own.
    SounderDone,
}

/// Raw pins of one station board.
///
/// Polarity comes from [`WiringConfig`](crate::config::WiringConfig).
#[derive(Debug)]
pub struct StationPins<O, I> {
    /// Sounder driver.
    pub sounder: O,
    /// Busy line output.
    pub busy_out: O,
    /// Busy lamp.
    pub busy_lamp: O,
    /// "Regular" train button.
    pub regular: I,
    /// "Extra" train button.
    pub extra: I,
    /// Dispatcher stop line.
    pub stop: I,
    /// Busy line input.
    pub busy_in: I,
    /// Selector common contact.
    pub selector_sense: I,
    /// Selector scan outputs, one per position.
    pub selector_scan: Vec<O, MAX_SELECTOR_POSITIONS>,
}

/// Point-in-time view of the station for logs and displays.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StationStatus {
    /// Current leaf mode.
    pub mode: StationMode,
    /// Station index and validity.
    pub settings: StationSettings,
    /// Selector position.
    pub selection: usize,
    /// Sounder energized.
    pub sounder: bool,
    /// Busy line driven.
    pub busy_out: bool,
    /// Busy lamp lit.
    pub busy_lamp: bool,
    /// Ambiance timer fired while not idle.
    pub ambiance_pending: bool,
}

/// One telegraph station.
pub struct Station<O, I, S, R>
where
    O: DigitalOutput,
    I: DigitalInput,
    S: SettingsStorage,
{
    machine: Machine<StationMode>,
    ctx: StationContext<R>,
    store: SettingsStore<S>,
    selector: TrainSelector<O, I>,
    regular: DebouncedInput<I>,
    extra: DebouncedInput<I>,
    stop: DebouncedInput<I>,
    busy_in: DebouncedInput<I>,
    sounder: OutputLine<O>,
    busy_out: OutputLine<O>,
    busy_lamp: OutputLine<O>,
    sounder_done: bool,
}

impl<O, I, S, R> Station<O, I, S, R>
where
    O: DigitalOutput,
    I: DigitalInput,
    S: SettingsStorage,
    R: RngCore,
{
    /// Bring the station up.
    ///
    /// Drives every output off, loads settings and starts the mode chart.
    /// The station goes straight to setup when the stored settings are
    /// missing, corrupt or name an unknown station, or when the regular or
    /// extra button is held at power-up.
    pub fn new(
        pins: StationPins<O, I>,
        config: Config,
        storage: S,
        rng: R,
        now_ms: u64,
    ) -> Result<Self, StationError<O::Error, S::Error>> {
        let wiring = config.wiring;
        let debounce = config.input.debounce_ms as u64;

        let sounder = OutputLine::new(pins.sounder, wiring.sounder).map_err(StationError::Output)?;
        let busy_out =
            OutputLine::new(pins.busy_out, wiring.busy_out).map_err(StationError::Output)?;
        let busy_lamp =
            OutputLine::new(pins.busy_lamp, wiring.busy_lamp).map_err(StationError::Output)?;

        let regular = DebouncedInput::new(pins.regular, wiring.regular, debounce, now_ms);
        let extra = DebouncedInput::new(pins.extra, wiring.extra, debounce, now_ms);
        let stop = DebouncedInput::new(pins.stop, wiring.stop, debounce, now_ms);
        let busy_in = DebouncedInput::new(pins.busy_in, wiring.busy_in, debounce, now_ms);

        let mut selector = TrainSelector::new(
            pins.selector_sense,
            wiring.selector_sense,
            config.input.scan_dwell_ms as u64,
            now_ms,
        );
        for (i, pin) in pins.selector_scan.into_iter().enumerate() {
            let mut fallback = ShortString::new();
            let label = match config.station.train_labels.get(i) {
                Some(label) => label.as_str(),
                None => {
                    let _ = write!(fallback, "{}", i + 1);
                    fallback.as_str()
                }
            };
            selector
                .add_position(pin, wiring.selector_scan, label)
                .map_err(StationError::Output)?;
        }

        let mut store = SettingsStore::new(storage);
        let mut settings = store.load().map_err(StationError::Storage)?;
        if settings.valid && settings.station as usize >= config.station.station_count() {
            warn!("station: stored station {} is not configured", settings.station);
            settings.valid = false;
        }

        let mut ctx = StationContext::new(config, settings, rng, now_ms);
        ctx.select(selector.selected(), selector.label());

        let mut machine = Machine::new(StationMode::On);
        machine.start(&mut ctx);

        let held = regular.is_pressed() || extra.is_pressed();
        if !settings.valid || held {
            info!(
                "station: entering setup ({})",
                if held { "button held" } else { "no settings" }
            );
            machine.transition(&mut ctx, StationMode::Setup);
        } else {
            info!("station: {} ready", ctx.station_name());
        }

        let mut station = Self {
            machine,
            ctx,
            store,
            selector,
            regular,
            extra,
            stop,
            busy_in,
            sounder,
            busy_out,
            busy_lamp,
            sounder_done: false,
        };
        station.write_outputs()?;
        Ok(station)
    }

    /// Run one pass of the control loop at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Result<(), StationError<O::Error, S::Error>> {
        self.ctx.now_ms = now_ms;

        if self.selector.poll(now_ms).map_err(StationError::Output)? {
            debug!("station: selector at {}", self.selector.label());
            self.ctx.select(self.selector.selected(), self.selector.label());
            self.dispatch(Signal::TrainSelected);
        }
        if self.regular.poll(now_ms) {
            self.dispatch(Signal::Regular(self.regular.is_pressed()));
        }
        if self.extra.poll(now_ms) {
            self.dispatch(Signal::Extra(self.extra.is_pressed()));
        }
        if self.stop.poll(now_ms) {
            self.dispatch(Signal::Stop(self.stop.is_pressed()));
        }
        if self.busy_in.poll(now_ms) {
            self.dispatch(Signal::Busy(self.busy_in.is_pressed()));
        }

        if self.ctx.ambiance_timer.poll(now_ms) {
            self.dispatch(Signal::Timeout(TimerId::Ambiance));
        }
        if self.ctx.lamp_timer.poll(now_ms) {
            self.dispatch(Signal::Timeout(TimerId::Lamp));
        }

        if core::mem::take(&mut self.sounder_done) {
            self.dispatch(Signal::SounderDone);
        }
        self.sounder_done = self.ctx.player.poll(now_ms);

        self.write_outputs()?;

        // Kept until written so a failed save is retried next tick
        if let Some(station) = self.ctx.save_request {
            self.store.save(station).map_err(StationError::Storage)?;
            self.ctx.save_request = None;
        }
        Ok(())
    }

    /// Deliver `signal` to the mode chart now.
    ///
    /// Outputs follow on the next [`tick`](Self::tick).
    pub fn dispatch(&mut self, signal: Signal) {
        debug!("station: {:?} in {:?}", signal, self.machine.current());
        self.machine.dispatch(&mut self.ctx, signal);
    }

    /// Current leaf mode.
    pub fn mode(&self) -> StationMode {
        self.machine.current()
    }

    /// True when `mode` is the current mode or encloses it.
    pub fn is_in(&self, mode: StationMode) -> bool {
        self.machine.is_in::<StationContext<R>>(mode)
    }

    /// Settings as loaded or last committed in setup.
    pub fn settings(&self) -> StationSettings {
        self.ctx.settings
    }

    /// Text most recently started on the sounder.
    pub fn telegram(&self) -> &str {
        &self.ctx.telegram
    }

    /// The dot code player.
    pub fn player(&self) -> &DotCodePlayer {
        &self.ctx.player
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    /// Snapshot for logs and displays.
    pub fn status(&self) -> StationStatus {
        StationStatus {
            mode: self.mode(),
            settings: self.ctx.settings,
            selection: self.ctx.selection,
            sounder: self.sounder.is_active(),
            busy_out: self.busy_out.is_active(),
            busy_lamp: self.busy_lamp.is_active(),
            ambiance_pending: self.ctx.ambiance_pending,
        }
    }

    fn write_outputs(&mut self) -> Result<(), StationError<O::Error, S::Error>> {
        self.sounder
            .set_active(self.ctx.player.is_active())
            .map_err(StationError::Output)?;
        self.busy_out
            .set_active(self.ctx.busy_out)
            .map_err(StationError::Output)?;
        let echo = self.ctx.lamp_follows_sounder && self.ctx.player.is_active();
        self.busy_lamp
            .set_active(self.ctx.lamp || echo)
            .map_err(StationError::Output)?;
        Ok(())
    }
}
