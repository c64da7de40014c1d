//! Station mode chart.
//!
//! ```text
//!   On ─┬─ Idle
//!       ├─ Busy ─────┬─ BusyLampOn
//!       │            └─ BusyLampOff
//!       ├─ Sounding
//!       ├─ Setup ────┬─ SetupValid
//!       │            └─ SetupError
//!       └─ Ambiance
//! ```
//!
//! Each mode is one handler function. Handlers consume the events they care
//! about and delegate the rest to their parent; `On` is the root and drops
//! whatever reaches it.

use log::info;
use rand::RngCore;

use super::context::StationContext;
use super::telegram::{self, AMBIANCE_MESSAGES, SETUP_PROMPT};
use super::Signal;
use crate::hsm::{Chart, Event, Outcome};
use crate::timer::TimerId;

use Outcome::{Delegate, Handled, Transition};

/// Operating mode of the station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StationMode {
    /// Powered up; parent of every other mode.
    On,
    /// Waiting for a train button, the busy line or ambiance.
    Idle,
    /// Another station holds the busy line.
    Busy,
    /// Busy lamp lit.
    BusyLampOn,
    /// Busy lamp dark.
    BusyLampOff,
    /// Sending the train report.
    Sounding,
    /// Choosing this station's identity with the selector.
    Setup,
    /// Selector on a known station; releasing the train button saves it.
    SetupValid,
    /// Selector not on a known station.
    SetupError,
    /// Playing period chatter.
    Ambiance,
}

impl StationMode {
    /// Enclosing mode, `None` for [`On`](Self::On).
    pub fn parent(self) -> Option<StationMode> {
        use StationMode::*;
        match self {
            On => None,
            Idle | Busy | Sounding | Setup | Ambiance => Some(On),
            BusyLampOn | BusyLampOff => Some(Busy),
            SetupValid | SetupError => Some(Setup),
        }
    }
}

impl<R: RngCore> Chart for StationContext<R> {
    type State = StationMode;
    type Signal = Signal;

    fn parent(state: StationMode) -> Option<StationMode> {
        state.parent()
    }

    fn handle(&mut self, state: StationMode, event: &Event<Signal>) -> Outcome<StationMode> {
        match state {
            StationMode::On => on(self, event),
            StationMode::Idle => idle(self, event),
            StationMode::Busy => busy(self, event),
            StationMode::BusyLampOn => busy_lamp_on(self, event),
            StationMode::BusyLampOff => busy_lamp_off(self, event),
            StationMode::Sounding => sounding(self, event),
            StationMode::Setup => setup(self, event),
            StationMode::SetupValid => setup_valid(self, event),
            StationMode::SetupError => setup_error(self, event),
            StationMode::Ambiance => ambiance(self, event),
        }
    }
}

type Ctx<R> = StationContext<R>;

fn on<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Init => Transition(StationMode::Idle),
        Event::Entry => {
            if ctx.is_ambiance_station() {
                ctx.schedule_ambiance();
            }
            Handled
        }
        // Missed while not idle; Idle replays it shortly after we return
        Event::Signal(Signal::Timeout(TimerId::Ambiance)) => {
            ctx.ambiance_pending = true;
            Handled
        }
        Event::Signal(_) => Delegate,
        Event::Exit => Handled,
    }
}

fn idle<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.busy_out = false;
            ctx.lamp = false;
            ctx.lamp_follows_sounder = false;
            if ctx.ambiance_pending {
                ctx.retry_ambiance();
            }
            Handled
        }
        Event::Signal(Signal::Regular(true)) | Event::Signal(Signal::Extra(true)) => {
            let extra = matches!(event, Event::Signal(Signal::Extra(_)));
            let text = telegram::dispatch(ctx.station_name(), extra, &ctx.train_label);
            info!("station: sending {:?}", text.as_str());
            ctx.telegram = text;
            Transition(StationMode::Sounding)
        }
        Event::Signal(Signal::Busy(true)) => Transition(StationMode::Busy),
        Event::Signal(Signal::Timeout(TimerId::Ambiance)) => Transition(StationMode::Ambiance),
        Event::Signal(_) => Delegate,
        Event::Init | Event::Exit => Handled,
    }
}

fn busy<R: RngCore>(_ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Init => Transition(StationMode::BusyLampOn),
        Event::Signal(Signal::Busy(false)) => Transition(StationMode::Idle),
        Event::Signal(Signal::Busy(true)) => Handled,
        Event::Signal(_) => Delegate,
        Event::Entry | Event::Exit => Handled,
    }
}

fn busy_lamp_on<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.lamp = true;
            ctx.arm_lamp();
            Handled
        }
        Event::Exit => {
            ctx.lamp_timer.cancel();
            ctx.lamp = false;
            Handled
        }
        Event::Signal(Signal::Timeout(TimerId::Lamp)) => Transition(StationMode::BusyLampOff),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

fn busy_lamp_off<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.lamp = false;
            ctx.arm_lamp();
            Handled
        }
        Event::Exit => {
            ctx.lamp_timer.cancel();
            Handled
        }
        Event::Signal(Signal::Timeout(TimerId::Lamp)) => Transition(StationMode::BusyLampOn),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

fn sounding<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.busy_out = true;
            ctx.lamp_follows_sounder = true;
            ctx.replay();
            Handled
        }
        Event::Exit => {
            ctx.player.cancel();
            Handled
        }
        Event::Signal(Signal::TrainSelected)
        | Event::Signal(Signal::Regular(true))
        | Event::Signal(Signal::Extra(true))
        | Event::Signal(Signal::Stop(_)) => Transition(StationMode::Idle),
        Event::Signal(Signal::Regular(false)) | Event::Signal(Signal::Extra(false)) => Handled,
        Event::Signal(Signal::SounderDone) => Transition(StationMode::Sounding),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

fn setup<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        // Force the operator to turn the selector before anything is saved
        Event::Init => Transition(StationMode::SetupError),
        Event::Signal(Signal::TrainSelected) => {
            if ctx.selection_is_station() {
                Transition(StationMode::SetupValid)
            } else {
                Transition(StationMode::SetupError)
            }
        }
        Event::Signal(_) => Delegate,
        Event::Entry | Event::Exit => Handled,
    }
}

fn setup_valid<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.settings.station = ctx.selection as u8;
            let text = telegram::identify(ctx.station_name());
            ctx.play(text);
            ctx.lamp_follows_sounder = true;
            Handled
        }
        Event::Exit => {
            ctx.player.cancel();
            ctx.lamp_follows_sounder = false;
            Handled
        }
        Event::Signal(Signal::Regular(false)) | Event::Signal(Signal::Extra(false)) => {
            info!("station: saving settings for {}", ctx.station_name());
            ctx.settings.valid = true;
            ctx.save_request = Some(ctx.settings.station);
            if ctx.is_ambiance_station() {
                ctx.schedule_ambiance();
            } else {
                ctx.ambiance_timer.cancel();
                ctx.ambiance_pending = false;
            }
            Transition(StationMode::Idle)
        }
        Event::Signal(Signal::SounderDone) => Transition(StationMode::SetupValid),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

fn setup_error<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            ctx.play(telegram::fixed(SETUP_PROMPT));
            ctx.lamp_follows_sounder = true;
            Handled
        }
        Event::Exit => {
            ctx.player.cancel();
            Handled
        }
        Event::Signal(Signal::SounderDone) => Transition(StationMode::SetupError),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

fn ambiance<R: RngCore>(ctx: &mut Ctx<R>, event: &Event<Signal>) -> Outcome<StationMode> {
    match event {
        Event::Entry => {
            let message = AMBIANCE_MESSAGES[ctx.pick(AMBIANCE_MESSAGES.len())];
            info!("station: ambiance {:?}", message);
            ctx.busy_out = true;
            ctx.lamp_follows_sounder = true;
            ctx.play(telegram::fixed(message));
            Handled
        }
        Event::Exit => {
            ctx.busy_out = false;
            ctx.lamp_follows_sounder = false;
            ctx.player.cancel();
            Handled
        }
        // Leave through On so a fresh delay is drawn
        Event::Signal(Signal::SounderDone) => Transition(StationMode::On),
        Event::Signal(_) => Delegate,
        Event::Init => Handled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::hsm::Machine;
    use crate::settings::StationSettings;
    use rand::rngs::mock::StepRng;

    fn machine(settings: StationSettings) -> (Machine<StationMode>, Ctx<StepRng>) {
        let mut ctx = StationContext::new(Config::default(), settings, StepRng::new(0, 0), 0);
        let mut machine = Machine::new(StationMode::On);
        machine.start(&mut ctx);
        (machine, ctx)
    }

    #[test]
    fn parent_table() {
        assert_eq!(StationMode::On.parent(), None);
        assert_eq!(StationMode::Idle.parent(), Some(StationMode::On));
        assert_eq!(StationMode::BusyLampOff.parent(), Some(StationMode::Busy));
        assert_eq!(StationMode::SetupError.parent(), Some(StationMode::Setup));
        assert_eq!(StationMode::Ambiance.parent(), Some(StationMode::On));
    }

    #[test]
    fn starts_idle() {
        let (machine, ctx) = machine(StationSettings::configured(2));
        assert_eq!(machine.current(), StationMode::Idle);
        assert!(!ctx.ambiance_timer.is_armed()); // station 2 is not the ambiance station
    }

    #[test]
    fn ambiance_station_arms_timer_on_start() {
        let (_machine, ctx) = machine(StationSettings::configured(0));
        assert_eq!(ctx.ambiance_timer.remaining_ms(0), Some(300_000));
    }

    #[test]
    fn busy_line_enters_lamp_on() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(1));
        machine.dispatch(&mut ctx, Signal::Busy(true));
        assert_eq!(machine.current(), StationMode::BusyLampOn);
        assert!(ctx.lamp);
        assert!(ctx.lamp_timer.is_armed());
    }

    #[test]
    fn lamp_alternates_and_release_cancels() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(1));
        machine.dispatch(&mut ctx, Signal::Busy(true));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Lamp));
        assert_eq!(machine.current(), StationMode::BusyLampOff);
        assert!(!ctx.lamp);
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Lamp));
        assert_eq!(machine.current(), StationMode::BusyLampOn);

        machine.dispatch(&mut ctx, Signal::Busy(false));
        assert_eq!(machine.current(), StationMode::Idle);
        assert!(!ctx.lamp_timer.is_armed());
        assert!(!ctx.lamp);
    }

    #[test]
    fn release_from_dark_lamp_returns_idle() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(1));
        machine.dispatch(&mut ctx, Signal::Busy(true));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Lamp));
        assert_eq!(machine.current(), StationMode::BusyLampOff);

        machine.dispatch(&mut ctx, Signal::Busy(false));
        assert_eq!(machine.current(), StationMode::Idle);
        assert!(!ctx.lamp_timer.is_armed());
        assert!(!ctx.lamp);
    }

    #[test]
    fn lamp_follows_sounder_while_transmitting() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(1));
        assert!(!ctx.lamp_follows_sounder);

        machine.dispatch(&mut ctx, Signal::Regular(true));
        assert!(ctx.lamp_follows_sounder);
        machine.dispatch(&mut ctx, Signal::Stop(true));
        assert!(!ctx.lamp_follows_sounder);

        machine.transition(&mut ctx, StationMode::Setup);
        assert_eq!(machine.current(), StationMode::SetupError);
        assert!(ctx.lamp_follows_sounder);
        ctx.select(2, "3");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        assert_eq!(machine.current(), StationMode::SetupValid);
        assert!(ctx.lamp_follows_sounder);
        machine.dispatch(&mut ctx, Signal::Regular(false));
        assert!(!ctx.lamp_follows_sounder);

        // Busy lamp runs on its own timer
        machine.dispatch(&mut ctx, Signal::Busy(true));
        assert!(!ctx.lamp_follows_sounder);
    }

    #[test]
    fn train_button_composes_report() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(4));
        ctx.select(2, "3");
        machine.dispatch(&mut ctx, Signal::Extra(true));
        assert_eq!(machine.current(), StationMode::Sounding);
        assert_eq!(ctx.telegram.as_str(), "WWW OS ~ST E3.~~~~");
        assert!(ctx.busy_out);
        assert!(ctx.player.is_playing());
    }

    #[test]
    fn sounding_ends_on_stop_or_selector() {
        for signal in [Signal::Stop(true), Signal::Stop(false), Signal::TrainSelected, Signal::Regular(true)] {
            let (mut machine, mut ctx) = machine(StationSettings::configured(1));
            machine.dispatch(&mut ctx, Signal::Regular(true));
            machine.dispatch(&mut ctx, signal);
            assert_eq!(machine.current(), StationMode::Idle, "{:?}", signal);
            assert!(!ctx.player.is_playing());
            assert!(!ctx.busy_out);
        }
    }

    #[test]
    fn sounding_ignores_button_release() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(1));
        machine.dispatch(&mut ctx, Signal::Regular(true));
        machine.dispatch(&mut ctx, Signal::Regular(false));
        assert_eq!(machine.current(), StationMode::Sounding);
    }

    #[test]
    fn setup_starts_in_error() {
        let (mut machine, mut ctx) = machine(StationSettings::default());
        machine.transition(&mut ctx, StationMode::Setup);
        assert_eq!(machine.current(), StationMode::SetupError);
        assert_eq!(ctx.telegram.as_str(), SETUP_PROMPT);
    }

    #[test]
    fn setup_follows_selector_validity() {
        let (mut machine, mut ctx) = machine(StationSettings::default());
        machine.transition(&mut ctx, StationMode::Setup);

        ctx.select(5, "6");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        assert_eq!(machine.current(), StationMode::SetupValid);
        assert_eq!(ctx.telegram.as_str(), "I AM FA.~~");

        ctx.select(7, "8");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        assert_eq!(machine.current(), StationMode::SetupError);

        ctx.select(1, "2");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        assert_eq!(machine.current(), StationMode::SetupValid);
        ctx.select(3, "4");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        assert_eq!(machine.current(), StationMode::SetupValid);
        assert_eq!(ctx.telegram.as_str(), "I AM PC.~~");
    }

    #[test]
    fn release_in_setup_valid_requests_save() {
        let (mut machine, mut ctx) = machine(StationSettings::default());
        machine.transition(&mut ctx, StationMode::Setup);
        ctx.select(3, "4");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        machine.dispatch(&mut ctx, Signal::Regular(false));
        assert_eq!(machine.current(), StationMode::Idle);
        assert_eq!(ctx.save_request, Some(3));
        assert_eq!(ctx.settings, StationSettings::configured(3));
    }

    #[test]
    fn saved_station_decides_ambiance_role() {
        // Unconfigured boards hold station 0, the ambiance station
        let (mut machine, mut ctx) = machine(StationSettings::default());
        assert!(ctx.ambiance_timer.is_armed());

        machine.transition(&mut ctx, StationMode::Setup);
        ctx.select(2, "3");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        machine.dispatch(&mut ctx, Signal::Extra(false));
        assert!(!ctx.ambiance_timer.is_armed());

        ctx.now_ms = 7_000;
        machine.transition(&mut ctx, StationMode::Setup);
        ctx.select(0, "1");
        machine.dispatch(&mut ctx, Signal::TrainSelected);
        machine.dispatch(&mut ctx, Signal::Regular(false));
        assert_eq!(ctx.ambiance_timer.remaining_ms(7_000), Some(300_000));
    }

    #[test]
    fn release_in_setup_error_does_nothing() {
        let (mut machine, mut ctx) = machine(StationSettings::default());
        machine.transition(&mut ctx, StationMode::Setup);
        machine.dispatch(&mut ctx, Signal::Extra(false));
        assert_eq!(machine.current(), StationMode::SetupError);
        assert_eq!(ctx.save_request, None);
    }

    #[test]
    fn missed_ambiance_is_retried_from_idle() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(0));
        machine.dispatch(&mut ctx, Signal::Busy(true));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Ambiance));
        assert!(ctx.ambiance_pending);

        ctx.now_ms = 1_000;
        machine.dispatch(&mut ctx, Signal::Busy(false));
        assert!(!ctx.ambiance_pending);
        assert_eq!(ctx.ambiance_timer.remaining_ms(1_000), Some(30_000));
    }

    #[test]
    fn ambiance_plays_and_returns_through_on() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(0));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Ambiance));
        assert_eq!(machine.current(), StationMode::Ambiance);
        assert_eq!(ctx.telegram.as_str(), AMBIANCE_MESSAGES[0]);
        assert!(ctx.busy_out);
        assert!(ctx.lamp_follows_sounder);

        ctx.now_ms = 50_000;
        machine.dispatch(&mut ctx, Signal::SounderDone);
        assert_eq!(machine.current(), StationMode::Idle);
        assert!(!ctx.busy_out);
        assert!(!ctx.lamp_follows_sounder);
        assert_eq!(ctx.ambiance_timer.remaining_ms(50_000), Some(300_000));
    }

    #[test]
    fn ambiance_ignores_buttons() {
        let (mut machine, mut ctx) = machine(StationSettings::configured(0));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Ambiance));
        machine.dispatch(&mut ctx, Signal::Regular(true));
        machine.dispatch(&mut ctx, Signal::Busy(true));
        assert_eq!(machine.current(), StationMode::Ambiance);
    }

    #[test]
    fn random_pick_uses_rng() {
        let mut ctx = StationContext::new(
            Config::default(),
            StationSettings::configured(0),
            StepRng::new(0x8000_0000, 0),
            0,
        );
        let mut machine = Machine::new(StationMode::On);
        machine.start(&mut ctx);
        // Half way through the variance window
        assert_eq!(ctx.ambiance_timer.remaining_ms(0), Some(600_000));
        machine.dispatch(&mut ctx, Signal::Timeout(TimerId::Ambiance));
        assert_eq!(ctx.telegram.as_str(), AMBIANCE_MESSAGES[3]);
    }
}
