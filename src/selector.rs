//! Multiplexed rotary train selector.
//!
//! The selector switch has one common contact wired to a shared sense input
//! and one position contact per scan output. The scanner drives one output
//! at a time, dwells for at least the scan period, then samples the sense
//! line: if it reads active, the wiper is sitting on the driven position.
//!
//! ```text
//!   scan 0 ──┐
//!   scan 1 ──┤  rotary   ├── sense input
//!   scan 2 ──┤  switch
//!   ...    ──┘
//! ```
//!
//! Each position carries a label (the train number played in a telegram).
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::selector::TrainSelector;
//! use rs_sounder::hal::{MockInput, MockOutput};
//! use rs_sounder::traits::ActiveLevel;
//!
//! let sense = MockInput::with_level(true); // active low, idle high
//! let mut selector = TrainSelector::new(sense.clone(), ActiveLevel::Low, 10, 0);
//! selector.add_position(MockOutput::new(), ActiveLevel::Low, "1").unwrap();
//! selector.add_position(MockOutput::new(), ActiveLevel::Low, "2").unwrap();
//!
//! // Wiper on position 1: the sense line only reads active while
//! // position 1 is driven.
//! sense.set_high(true);
//! assert!(!selector.poll(10).unwrap()); // samples position 0, moves to 1
//! sense.set_high(false);
//! assert!(selector.poll(20).unwrap()); // samples position 1: changed
//! assert_eq!(selector.selected(), 1);
//! assert_eq!(selector.label(), "2");
//! ```

use heapless::Vec;
use log::warn;

use crate::config::{short_string, ShortString};
use crate::input::OutputLine;
use crate::traits::{ActiveLevel, DigitalInput, DigitalOutput};

/// Maximum number of selector positions.
pub const MAX_SELECTOR_POSITIONS: usize = 16;

/// Default dwell time per scanned position in milliseconds.
pub const DEFAULT_SCAN_DWELL_MS: u64 = 10;

/// One scanned position of the selector.
#[derive(Debug)]
struct Position<O: DigitalOutput> {
    line: OutputLine<O>,
    label: ShortString,
}

/// Cyclic scanner for a multiplexed rotary switch.
#[derive(Debug)]
pub struct TrainSelector<O: DigitalOutput, I: DigitalInput> {
    sense: I,
    sense_active: ActiveLevel,
    positions: Vec<Position<O>, MAX_SELECTOR_POSITIONS>,
    dwell_ms: u64,
    scan_started_ms: u64,
    scanned: usize,
    selected: usize,
    changed: bool,
}

impl<O: DigitalOutput, I: DigitalInput> TrainSelector<O, I> {
    /// Create a selector with no positions.
    pub fn new(sense: I, sense_active: ActiveLevel, dwell_ms: u64, now_ms: u64) -> Self {
        Self {
            sense,
            sense_active,
            positions: Vec::new(),
            dwell_ms,
            scan_started_ms: now_ms,
            scanned: 0,
            selected: 0,
            changed: false,
        }
    }

    /// Append a position driven by `pin`.
    ///
    /// The first position is driven straight away so the first dwell samples
    /// a real contact. Positions beyond [`MAX_SELECTOR_POSITIONS`] are ignored.
    pub fn add_position(
        &mut self,
        pin: O,
        active: ActiveLevel,
        label: &str,
    ) -> Result<(), O::Error> {
        let mut line = OutputLine::new(pin, active)?;
        if self.positions.is_empty() {
            line.set_active(true)?;
        }
        let position = Position {
            line,
            label: short_string(label),
        };
        if self.positions.push(position).is_err() {
            warn!("selector: position {} ignored (capacity {})", label, MAX_SELECTOR_POSITIONS);
        }
        Ok(())
    }

    /// Advance the scan. Returns true on the tick the selection changes.
    pub fn poll(&mut self, now_ms: u64) -> Result<bool, O::Error> {
        self.changed = false;
        if self.positions.is_empty() || now_ms.saturating_sub(self.scan_started_ms) < self.dwell_ms
        {
            return Ok(false);
        }

        if self.sense_active.is_active(self.sense.is_high()) {
            self.changed = self.selected != self.scanned;
            self.selected = self.scanned;
        }

        self.positions[self.scanned].line.set_active(false)?;
        self.scanned = (self.scanned + 1) % self.positions.len();
        self.positions[self.scanned].line.set_active(true)?;
        self.scan_started_ms = now_ms;

        Ok(self.changed)
    }

    /// Whether the last [`poll`](Self::poll) changed the selection.
    #[inline]
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Index of the selected position.
    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Label of the selected position (empty when there are no positions).
    pub fn label(&self) -> &str {
        self.positions
            .get(self.selected)
            .map(|p| p.label.as_str())
            .unwrap_or("")
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no positions are configured.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
