//! Railroad dot code encoder and non-blocking sounder player.
//!
//! Dot code sends each letter as groups of evenly spaced clicks. A codeword
//! is a string of digits; each digit is the number of clicks in one group:
//! `"S"` is `121` (click, pause, click-click, pause, click).
//!
//! Text is encoded greedily with [`ENCODE_TABLE`], which lists the common
//! multi-letter abbreviations before the single letters so that `"AND"`
//! becomes one codeword instead of three. A few characters are special:
//!
//! | Input | Codeword |
//! |-------|----------|
//! | whitespace run | `3` (end of word) |
//! | punctuation, then more text | `33` (end of sentence) |
//! | punctuation, then end of text or `~` | `333` (end of message) |
//! | `~` | one second of silence |
//! | anything else unknown | `121212333`, rest of text dropped |
//!
//! [`DotCodePlayer`] plays a telegram against the tick clock without ever
//! blocking. Call [`poll`](DotCodePlayer::poll) once per tick and drive the
//! sounder from [`is_active`](DotCodePlayer::is_active).
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::config::TimingConfig;
//! use rs_sounder::dot_code::DotCodePlayer;
//!
//! let mut player = DotCodePlayer::new(TimingConfig::default());
//! player.start("T", 0);
//!
//! assert!(!player.poll(499)); // lead-in
//! assert!(!player.is_active());
//! player.poll(500);
//! assert!(player.is_active()); // click
//! player.poll(550);
//! assert!(!player.is_active());
//! assert!(player.poll(1750)); // done after the end-of-codeword pause
//! ```

use log::{debug, warn};

use crate::config::{truncate_to, TimingConfig};

/// Longest telegram the player holds.
pub const MAX_TELEGRAM_LEN: usize = 200;

/// Bounded telegram text.
pub type Telegram = heapless::String<MAX_TELEGRAM_LEN>;

/// Character that plays a fixed silent gap.
pub const SILENCE_MARKER: u8 = b'~';

/// Codeword for a run of whitespace.
pub const END_OF_WORD: &str = "3";
/// Codeword for punctuation followed by more text.
pub const END_OF_SENTENCE: &str = "33";
/// Codeword for punctuation at the end of the text or before `~`.
pub const END_OF_MESSAGE: &str = "333";
/// Codeword played for text that has no encoding.
pub const GARBLED: &str = "121212333";

/// Prefix to codeword table, searched top to bottom.
pub static ENCODE_TABLE: [(&str, &str); 40] = [
    ("AND", "2222"),
    ("ED", "1222"),
    ("ING", "1121"),
    ("TION", "2221"),
    ("A", "11"),
    ("B", "1221"),
    ("C", "212"),
    ("D", "111"),
    ("E", "21"),
    ("F", "1112"),
    ("G", "1122"),
    ("H", "211"),
    ("I", "2"),
    ("J", "2211"),
    ("K", "1212"),
    ("L", "112"),
    ("M", "2112"),
    ("N", "22"),
    ("O", "12"),
    ("P", "2121"),
    ("Q", "2122"),
    ("R", "122"),
    ("S", "121"),
    ("T", "1"),
    ("U", "221"),
    ("V", "2111"),
    ("W", "2212"),
    ("X", "1211"),
    ("Y", "222"),
    ("Z", "1111"),
    ("0", "11111"),
    ("1", "12221"),
    ("2", "21112"),
    ("3", "11211"),
    ("4", "11121"),
    ("5", "11112"),
    ("6", "21111"),
    ("7", "22111"),
    ("8", "22221"),
    ("9", "22122"),
];

// ============================================================================
// Encoder
// ============================================================================

/// One step of an encoded telegram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    /// A codeword of click-group digits.
    Codeword(&'static str),
    /// A silent gap (`~`).
    Silence,
}

/// Encode the element starting at `*cursor`, advancing the cursor past it.
///
/// Returns `None` at the end of the text. Unencodable input moves the
/// cursor to the end so the garbled marker is the last element.
pub fn next_element(text: &[u8], cursor: &mut usize) -> Option<Element> {
    let rest = text.get(*cursor..)?;
    let first = *rest.first()?;

    if first == SILENCE_MARKER {
        *cursor += 1;
        return Some(Element::Silence);
    }

    if first.is_ascii_punctuation() {
        let skip = rest[1..]
            .iter()
            .take_while(|&&b| is_space(b))
            .count();
        *cursor += 1 + skip;
        let code = match text.get(*cursor) {
            None | Some(&SILENCE_MARKER) => END_OF_MESSAGE,
            Some(_) => END_OF_SENTENCE,
        };
        return Some(Element::Codeword(code));
    }

    if is_space(first) {
        *cursor += rest.iter().take_while(|&&b| is_space(b)).count();
        return Some(Element::Codeword(END_OF_WORD));
    }

    match ENCODE_TABLE
        .iter()
        .find(|(prefix, _)| rest.starts_with(prefix.as_bytes()))
    {
        Some(&(prefix, code)) => {
            *cursor += prefix.len();
            Some(Element::Codeword(code))
        }
        None => {
            warn!("dot code: no encoding at {:?}, dropping rest", first as char);
            *cursor = text.len();
            Some(Element::Codeword(GARBLED))
        }
    }
}

/// C `isspace`: ASCII whitespace plus vertical tab.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Iterator over the elements of a telegram.
///
/// ```
/// use rs_sounder::dot_code::{encode, Element};
///
/// let elements: Vec<_> = encode("ANDY").collect();
/// assert_eq!(elements, [Element::Codeword("2222"), Element::Codeword("222")]);
/// ```
#[derive(Clone, Debug)]
pub struct Elements<'a> {
    text: &'a [u8],
    cursor: usize,
}

impl Iterator for Elements<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        next_element(self.text, &mut self.cursor)
    }
}

/// Encode `text` into dot code elements.
pub fn encode(text: &str) -> Elements<'_> {
    Elements {
        text: text.as_bytes(),
        cursor: 0,
    }
}

/// Total playback time of `text`, from `start` to natural completion.
pub fn telegram_duration_ms(text: &str, timing: &TimingConfig) -> u64 {
    let pulse = timing.pulse_ms as u64;
    let pulse_gap = timing.pulse_gap_ms as u64;

    let mut total = timing.lead_in_ms as u64;
    for element in encode(text) {
        match element {
            Element::Silence => total += timing.silence_ms as u64,
            Element::Codeword(code) => {
                for (i, digit) in code.bytes().enumerate() {
                    let clicks = digit.saturating_sub(b'0') as u64;
                    total += clicks * pulse + clicks.saturating_sub(1) * pulse_gap;
                    total += if i + 1 == code.len() {
                        timing.symbol_gap_ms() as u64
                    } else {
                        timing.group_gap_ms() as u64
                    };
                }
            }
        }
    }
    total
}

// ============================================================================
// Player
// ============================================================================

/// Phase of a [`DotCodePlayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackState {
    /// Nothing to play.
    Done,
    /// Sounder on for one click.
    Pulsing,
    /// Sounder off between clicks, groups, codewords or for `~`.
    Gapping,
}

/// Tick-polled dot code player.
#[derive(Debug)]
pub struct DotCodePlayer {
    timing: TimingConfig,
    state: PlaybackState,
    text: Telegram,
    cursor: usize,
    /// Digits of the current codeword not yet started.
    code: &'static [u8],
    /// Clicks left in the current digit, including one in progress.
    pulses_left: u8,
    gap_ms: u64,
    since_ms: u64,
}

impl DotCodePlayer {
    /// Create an idle player.
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            state: PlaybackState::Done,
            text: Telegram::new(),
            cursor: 0,
            code: &[],
            pulses_left: 0,
            gap_ms: 0,
            since_ms: 0,
        }
    }

    /// Start playing `text`, replacing anything in progress.
    ///
    /// Playback begins with the lead-in gap. Text longer than
    /// [`MAX_TELEGRAM_LEN`] is truncated.
    pub fn start(&mut self, text: &str, now_ms: u64) {
        let kept = truncate_to(text, MAX_TELEGRAM_LEN);
        if kept.len() < text.len() {
            warn!("dot code: telegram truncated to {} bytes", kept.len());
        }
        self.text.clear();
        let _ = self.text.push_str(kept);
        debug!("dot code: start {:?}", self.text.as_str());

        self.cursor = 0;
        self.code = &[];
        self.pulses_left = 0;
        self.enter_gap(self.timing.lead_in_ms as u64, now_ms);
    }

    /// Stop immediately. The sounder reads off from now on.
    pub fn cancel(&mut self) {
        if self.state != PlaybackState::Done {
            debug!("dot code: cancelled");
        }
        self.state = PlaybackState::Done;
    }

    /// Advance playback. Returns true only on the tick the telegram finishes
    /// on its own.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let elapsed = now_ms.saturating_sub(self.since_ms);

        match self.state {
            PlaybackState::Done => false,
            PlaybackState::Pulsing => {
                if elapsed >= self.timing.pulse_ms as u64 {
                    self.pulses_left = self.pulses_left.saturating_sub(1);
                    let gap = if self.pulses_left > 0 {
                        self.timing.pulse_gap_ms
                    } else if self.code.is_empty() {
                        self.timing.symbol_gap_ms()
                    } else {
                        self.timing.group_gap_ms()
                    };
                    self.enter_gap(gap as u64, now_ms);
                }
                false
            }
            PlaybackState::Gapping => {
                if elapsed < self.gap_ms {
                    false
                } else if self.pulses_left > 0 {
                    self.enter_pulse(now_ms);
                    false
                } else {
                    self.advance(now_ms)
                }
            }
        }
    }

    /// True while the sounder should be energized.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == PlaybackState::Pulsing
    }

    /// True until playback completes or is cancelled.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state != PlaybackState::Done
    }

    /// Current phase.
    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The telegram last passed to [`start`](Self::start).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Timing in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Start the next digit, pulling codewords from the text as needed.
    fn advance(&mut self, now_ms: u64) -> bool {
        loop {
            if let Some((&digit, rest)) = self.code.split_first() {
                self.code = rest;
                self.pulses_left = digit.saturating_sub(b'0');
                self.enter_pulse(now_ms);
                return false;
            }

            match next_element(self.text.as_bytes(), &mut self.cursor) {
                None => {
                    debug!("dot code: done");
                    self.state = PlaybackState::Done;
                    return true;
                }
                Some(Element::Silence) => {
                    debug!("dot code: ~");
                    self.enter_gap(self.timing.silence_ms as u64, now_ms);
                    return false;
                }
                Some(Element::Codeword(code)) => {
                    debug!("dot code: {}", code);
                    self.code = code.as_bytes();
                }
            }
        }
    }

    fn enter_pulse(&mut self, now_ms: u64) {
        self.state = PlaybackState::Pulsing;
        self.since_ms = now_ms;
    }

    fn enter_gap(&mut self, gap_ms: u64, now_ms: u64) {
        self.state = PlaybackState::Gapping;
        self.gap_ms = gap_ms;
        self.since_ms = now_ms;
    }
}
