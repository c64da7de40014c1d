//! Shared state that every station mode handler reads and writes.
//!
//! Handlers never touch hardware. They record the desired busy output and
//! lamp levels, start or cancel the player, arm timers and request settings
//! saves; [`Station::tick`](crate::Station::tick) applies all of it after
//! the signals for the tick have been dispatched.

use log::debug;
use rand::{Rng, RngCore};

use crate::config::{short_string, Config, ShortString};
use crate::dot_code::{DotCodePlayer, Telegram};
use crate::settings::StationSettings;
use crate::timer::Timer;

/// The station's blackboard.
#[derive(Debug)]
pub struct StationContext<R> {
    pub(crate) config: Config,
    pub(crate) settings: StationSettings,
    /// Selector position and its label, refreshed when the selector moves.
    pub(crate) selection: usize,
    pub(crate) train_label: ShortString,
    /// Text most recently handed to the player.
    pub(crate) telegram: Telegram,
    pub(crate) player: DotCodePlayer,
    pub(crate) ambiance_timer: Timer,
    pub(crate) lamp_timer: Timer,
    /// The ambiance timer fired while the station was not idle.
    pub(crate) ambiance_pending: bool,
    pub(crate) busy_out: bool,
    pub(crate) lamp: bool,
    /// Busy lamp echoes the sounder while set.
    pub(crate) lamp_follows_sounder: bool,
    pub(crate) save_request: Option<u8>,
    pub(crate) now_ms: u64,
    pub(crate) rng: R,
}

impl<R: RngCore> StationContext<R> {
    /// Fresh context with everything off.
    pub fn new(config: Config, settings: StationSettings, rng: R, now_ms: u64) -> Self {
        let player = DotCodePlayer::new(config.timing.clone());
        Self {
            config,
            settings,
            selection: 0,
            train_label: ShortString::new(),
            telegram: Telegram::new(),
            player,
            ambiance_timer: Timer::new(),
            lamp_timer: Timer::new(),
            ambiance_pending: false,
            busy_out: false,
            lamp: false,
            lamp_follows_sounder: false,
            save_request: None,
            now_ms,
            rng,
        }
    }

    /// Record the selector position.
    pub(crate) fn select(&mut self, index: usize, label: &str) {
        self.selection = index;
        self.train_label = short_string(label);
    }

    /// Name of the configured station.
    pub(crate) fn station_name(&self) -> &str {
        self.config
            .station
            .station_name(self.settings.station as usize)
            .unwrap_or("")
    }

    /// Whether this station plays ambiance chatter.
    pub(crate) fn is_ambiance_station(&self) -> bool {
        self.settings.station == self.config.station.ambiance_station
    }

    /// Whether the selector sits on a known station.
    pub(crate) fn selection_is_station(&self) -> bool {
        self.selection < self.config.station.station_count()
    }

    /// Arm the ambiance timer for the base delay plus a random variance.
    pub(crate) fn schedule_ambiance(&mut self) {
        let ambiance = &self.config.ambiance;
        let mut delay = ambiance.base_delay_ms as u64;
        if ambiance.random_variance_ms > 0 {
            delay += self.rng.gen_range(0..ambiance.random_variance_ms) as u64;
        }
        debug!("station: ambiance in {} ms", delay);
        self.ambiance_timer.arm(delay, self.now_ms);
        self.ambiance_pending = false;
    }

    /// Re-arm the short ambiance retry after a missed slot.
    pub(crate) fn retry_ambiance(&mut self) {
        self.ambiance_pending = false;
        self.ambiance_timer
            .arm(self.config.ambiance.retry_delay_ms as u64, self.now_ms);
    }

    /// Uniformly pick an index below `n` (`n` > 0).
    pub(crate) fn pick(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n as u32) as usize
    }

    /// Arm the busy lamp blink timer.
    pub(crate) fn arm_lamp(&mut self) {
        self.lamp_timer
            .arm(self.config.station.lamp_blink_ms as u64, self.now_ms);
    }

    /// Replace the telegram and start playing it.
    pub(crate) fn play(&mut self, telegram: Telegram) {
        self.telegram = telegram;
        self.replay();
    }

    /// Start the current telegram again from the top.
    pub(crate) fn replay(&mut self) {
        self.player.start(&self.telegram, self.now_ms);
    }
}
