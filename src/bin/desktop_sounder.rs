//! Desktop sounder simulator.
//!
//! Plays a telegram in real time on the terminal. The codewords are logged
//! first, then every click of the sounder prints `*`.
//!
//! ```bash
//! cargo run --features sim --bin desktop_sounder -- "WWW OS ~ST E1.~~~~"
//! RUST_LOG=debug cargo run --features sim --bin desktop_sounder -- --station
//! ```
//!
//! `--station` runs a whole simulated station instead: it presses the
//! "regular" button, lets the report play once and releases the stop line.

use std::io::Write;
use std::thread;
use std::time::Duration;

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rs_sounder::dot_code::{encode, telegram_duration_ms, DotCodePlayer, Element};
use rs_sounder::hal::{MockEeprom, MockInput, MockOutput, StdClock};
use rs_sounder::settings::encode_record;
use rs_sounder::traits::Clock;
use rs_sounder::{Config, Station, StationMode, StationPins};

const DEFAULT_TELEGRAM: &str = "WWW OS ~DS E1.~~~~";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--station") {
        return run_station();
    }

    let text = if args.is_empty() {
        DEFAULT_TELEGRAM.to_string()
    } else {
        args.join(" ").to_uppercase()
    };
    play(&text)
}

/// Play `text` through a bare player.
fn play(text: &str) -> anyhow::Result<()> {
    let config = Config::default();
    let codes: Vec<String> = encode(text)
        .map(|e| match e {
            Element::Codeword(code) => code.to_string(),
            Element::Silence => "~".to_string(),
        })
        .collect();
    info!("{:?} -> {}", text, codes.join(" "));
    info!(
        "{:.1} s of playback",
        telegram_duration_ms(text, &config.timing) as f64 / 1000.0
    );

    let clock = StdClock::new();
    let mut player = DotCodePlayer::new(config.timing.clone());
    player.start(text, clock.now_ms());

    let mut out = std::io::stdout();
    let mut was_on = false;
    loop {
        let done = player.poll(clock.now_ms());
        let on = player.is_active();
        if on && !was_on {
            write!(out, "*")?;
            out.flush()?;
        }
        was_on = on;
        if done {
            writeln!(out)?;
            return Ok(());
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Drive a full station against mock pins.
fn run_station() -> anyhow::Result<()> {
    let config = Config::default();
    let regular = MockInput::with_level(true);
    let stop = MockInput::with_level(true);
    let sounder = MockOutput::new();
    let busy_out = MockOutput::new();

    let pins = StationPins {
        sounder: sounder.clone(),
        busy_out: busy_out.clone(),
        busy_lamp: MockOutput::new(),
        regular: regular.clone(),
        extra: MockInput::with_level(true),
        stop: stop.clone(),
        busy_in: MockInput::with_level(true),
        selector_sense: MockInput::with_level(true),
        selector_scan: (0..8).map(|_| MockOutput::new()).collect(),
    };
    let eeprom = MockEeprom::with_bytes(&encode_record(0));
    let clock = StdClock::new();
    let mut station = Station::new(
        pins,
        config.clone(),
        eeprom,
        SmallRng::seed_from_u64(clock.now_ms()),
        clock.now_ms(),
    )
    .map_err(|e| anyhow::anyhow!("station init failed: {}", e))?;
    info!("station up in {:?}", station.mode());

    let mut out = std::io::stdout();
    let mut mode = station.mode();
    let mut was_on = false;
    let mut stop_at = None;

    regular.set_high(false);
    loop {
        let now = clock.now_ms();
        station
            .tick(now)
            .map_err(|e| anyhow::anyhow!("tick failed: {}", e))?;

        let on = sounder.is_high();
        if on && !was_on {
            write!(out, "*")?;
            out.flush()?;
        }
        was_on = on;

        if station.mode() != mode {
            writeln!(out)?;
            info!("{:?} -> {:?} (busy out {})", mode, station.mode(), busy_out.is_high());
            mode = station.mode();
            match mode {
                StationMode::Sounding => {
                    regular.set_high(true);
                    // One full report, then the dispatcher cuts in on the repeat
                    let length = telegram_duration_ms(station.telegram(), &config.timing);
                    stop_at = Some(now + length + 2_000);
                }
                StationMode::Idle => {
                    stop.set_high(true);
                    info!("stopped by dispatcher");
                    return Ok(());
                }
                _ => {}
            }
        }

        if stop_at.map_or(false, |at| now >= at) {
            stop.set_high(false);
            stop_at = None;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
