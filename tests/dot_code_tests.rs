//! Integration tests for the dot code player
//!
//! These listen to the player the way an operator would: they record every
//! click and turn the gaps between clicks back into codewords.

use rs_sounder::config::TimingConfig;
use rs_sounder::dot_code::{encode, telegram_duration_ms, DotCodePlayer, Element, GARBLED};
use rs_sounder::station::telegram::{dispatch, AMBIANCE_MESSAGES};
use rs_sounder::PlaybackState;

/// Poll `player` every millisecond from `from` until it finishes.
///
/// Returns the (on, off) time of every click and the completion time.
fn record(player: &mut DotCodePlayer, from: u64) -> (Vec<(u64, u64)>, u64) {
    let mut clicks = Vec::new();
    let mut on_at = None;
    for now in from..from + 1_000_000 {
        let done = player.poll(now);
        match (player.is_active(), on_at) {
            (true, None) => on_at = Some(now),
            (false, Some(start)) => {
                clicks.push((start, now));
                on_at = None;
            }
            _ => {}
        }
        if done {
            return (clicks, now);
        }
    }
    panic!("telegram never finished");
}

/// Decode recorded clicks into codewords, with `~` for each silence heard
/// between codewords.
fn listen(clicks: &[(u64, u64)], timing: &TimingConfig) -> Vec<String> {
    let pulse_gap = timing.pulse_gap_ms as u64;
    let group_gap = timing.group_gap_ms() as u64;
    let symbol_gap = timing.symbol_gap_ms() as u64;
    let silence = timing.silence_ms as u64;

    let mut heard = vec![String::new()];
    let mut count = 0u8;
    let mut last_off: Option<u64> = None;

    for &(on, off) in clicks {
        assert_eq!(off - on, timing.pulse_ms as u64, "click at {} has wrong length", on);
        if let Some(prev) = last_off {
            let gap = on - prev;
            if gap != pulse_gap {
                heard.last_mut().unwrap().push((b'0' + count) as char);
                count = 0;
                if gap == group_gap {
                    // next digit of the same codeword
                } else {
                    assert!(gap >= symbol_gap, "odd gap of {} ms before {}", gap, on);
                    assert_eq!((gap - symbol_gap) % silence, 0, "odd gap of {} ms", gap);
                    for _ in 0..(gap - symbol_gap) / silence {
                        heard.push("~".to_string());
                    }
                    heard.push(String::new());
                }
            }
        }
        count += 1;
        last_off = Some(off);
    }
    if count > 0 {
        heard.last_mut().unwrap().push((b'0' + count) as char);
    }
    heard.retain(|word| !word.is_empty());
    heard
}

/// What a listener should hear for `text`: every element, minus silences
/// that no click follows.
fn expected(text: &str) -> Vec<String> {
    let mut words: Vec<String> = encode(text)
        .map(|element| match element {
            Element::Codeword(code) => code.to_string(),
            Element::Silence => "~".to_string(),
        })
        .collect();
    while words.first().map(String::as_str) == Some("~") {
        words.remove(0);
    }
    while words.last().map(String::as_str) == Some("~") {
        words.pop();
    }
    words
}

// ============================================================================
// Heard Telegrams
// ============================================================================

#[test]
fn dispatch_report_is_heard_as_encoded() {
    let timing = TimingConfig::default();
    let text = dispatch("ST", true, "1");
    let mut player = DotCodePlayer::new(timing.clone());
    player.start(&text, 0);

    let (clicks, finished) = record(&mut player, 0);

    assert_eq!(listen(&clicks, &timing), expected(&text));
    assert_eq!(finished, telegram_duration_ms(&text, &timing));
    // Lead-in before the first click
    assert_eq!(clicks[0].0, timing.lead_in_ms as u64);
}

#[test]
fn ambiance_messages_are_heard_as_encoded() {
    let timing = TimingConfig::default();
    let mut player = DotCodePlayer::new(timing.clone());

    for message in AMBIANCE_MESSAGES {
        player.start(message, 10_000);
        let (clicks, finished) = record(&mut player, 10_000);
        assert_eq!(listen(&clicks, &timing), expected(message), "{}", message);
        assert_eq!(finished - 10_000, telegram_duration_ms(message, &timing));
    }
}

#[test]
fn silences_stretch_the_gap() {
    let timing = TimingConfig::default();
    let mut player = DotCodePlayer::new(timing.clone());
    player.start("T~~T", 0);

    let (clicks, _) = record(&mut player, 0);

    assert_eq!(listen(&clicks, &timing), ["1", "~", "~", "1"]);
    let gap = clicks[1].0 - clicks[0].1;
    assert_eq!(gap, timing.symbol_gap_ms() as u64 + 2 * timing.silence_ms as u64);
}

#[test]
fn faster_timing_is_heard_the_same() {
    let timing = TimingConfig::default()
        .with_pulse_ms(20)
        .with_pulse_gap_ms(40)
        .with_lead_in_ms(100)
        .with_silence_ms(400);
    let text = "WWW OS ~AQ 7.~~~~";
    let mut player = DotCodePlayer::new(timing.clone());
    player.start(text, 0);

    let (clicks, finished) = record(&mut player, 0);

    assert_eq!(listen(&clicks, &timing), expected(text));
    assert_eq!(finished, telegram_duration_ms(text, &timing));
    assert!(finished < telegram_duration_ms(text, &TimingConfig::default()));
}

// ============================================================================
// Garbled Text
// ============================================================================

#[test]
fn garbled_text_ends_with_marker() {
    let timing = TimingConfig::default();
    let mut player = DotCodePlayer::new(timing.clone());
    player.start("SOS at once", 0);

    let (clicks, _) = record(&mut player, 0);

    assert_eq!(listen(&clicks, &timing), ["121", "12", "121", "3", GARBLED]);
}

// ============================================================================
// Interruption
// ============================================================================

#[test]
fn restart_mid_telegram_plays_only_new_text() {
    let timing = TimingConfig::default();
    let mut player = DotCodePlayer::new(timing.clone());
    player.start("WWW", 0);
    for now in 0..1_000 {
        player.poll(now);
    }

    player.start("T", 1_000);
    let (clicks, finished) = record(&mut player, 1_000);

    assert_eq!(listen(&clicks, &timing), ["1"]);
    assert_eq!(finished - 1_000, telegram_duration_ms("T", &timing));
    assert_eq!(player.state(), PlaybackState::Done);
}

#[test]
fn cancel_never_reports_completion() {
    let mut player = DotCodePlayer::new(TimingConfig::default());
    player.start("E", 0);
    for now in 0..600 {
        assert!(!player.poll(now));
    }
    player.cancel();
    for now in 600..20_000 {
        assert!(!player.poll(now));
        assert!(!player.is_active());
    }
}
