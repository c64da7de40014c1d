//! Debounced inputs and polarity-aware output lines.
//!
//! [`DebouncedInput`] turns a noisy [`DigitalInput`] into clean press/release
//! edges: a level must hold steady for the debounce window before it is
//! accepted. [`OutputLine`] hides the electrical polarity of an output so the
//! rest of the crate only ever says "on" or "off".
//!
//! # Example
//!
//! ```rust
//! use rs_sounder::input::DebouncedInput;
//! use rs_sounder::hal::MockInput;
//! use rs_sounder::traits::ActiveLevel;
//!
//! // Active-low push button, idle (pulled up)
//! let pin = MockInput::with_level(true);
//! let mut button = DebouncedInput::new(pin.clone(), ActiveLevel::Low, 10, 0);
//! assert!(!button.is_pressed());
//!
//! pin.set_high(false); // pressed
//! assert!(!button.poll(1));  // bounce window starts
//! assert!(!button.poll(10)); // not steady long enough yet
//! assert!(button.poll(11));  // edge reported once
//! assert!(button.is_pressed());
//! assert!(!button.poll(12));
//! ```

use crate::traits::{ActiveLevel, DigitalInput, DigitalOutput};

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 10;

/// Edge-detecting digital input with a settle window.
#[derive(Debug)]
pub struct DebouncedInput<P: DigitalInput> {
    pin: P,
    active: ActiveLevel,
    debounce_ms: u64,
    /// Accepted (debounced) state.
    pressed: bool,
    /// Raw state seen on the previous poll.
    last_raw: bool,
    /// When the raw state last changed.
    bounce_at_ms: u64,
    changed: bool,
}

impl<P: DigitalInput> DebouncedInput<P> {
    /// Wrap `pin`, sampling its current level as the initial accepted state.
    pub fn new(mut pin: P, active: ActiveLevel, debounce_ms: u64, now_ms: u64) -> Self {
        let pressed = active.is_active(pin.is_high());
        Self {
            pin,
            active,
            debounce_ms,
            pressed,
            last_raw: pressed,
            bounce_at_ms: now_ms,
            changed: false,
        }
    }

    /// Sample the pin. Returns true on the tick a debounced edge is accepted.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let raw = self.active.is_active(self.pin.is_high());
        self.changed = false;

        if raw != self.last_raw {
            self.bounce_at_ms = now_ms;
            self.last_raw = raw;
            return false;
        }
        if now_ms.saturating_sub(self.bounce_at_ms) < self.debounce_ms {
            return false;
        }

        self.changed = raw != self.pressed;
        self.pressed = raw;
        self.changed
    }

    /// Debounced state: true while the input is active.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the last [`poll`](Self::poll) accepted an edge.
    #[inline]
    pub fn changed(&self) -> bool {
        self.changed
    }
}

/// Digital output with a configured active level.
///
/// # Example
///
/// ```rust
/// use rs_sounder::input::OutputLine;
/// use rs_sounder::hal::MockOutput;
/// use rs_sounder::traits::ActiveLevel;
///
/// let probe = MockOutput::new();
/// let mut lamp = OutputLine::new(probe.clone(), ActiveLevel::Low).unwrap();
/// assert!(probe.is_high()); // off = high for an active-low lamp
///
/// lamp.set_active(true).unwrap();
/// assert!(!probe.is_high());
/// assert!(lamp.is_active());
/// ```
#[derive(Debug)]
pub struct OutputLine<P: DigitalOutput> {
    pin: P,
    active: ActiveLevel,
    on: bool,
}

impl<P: DigitalOutput> OutputLine<P> {
    /// Bind `pin` with polarity `active`, driving it off immediately.
    pub fn new(pin: P, active: ActiveLevel) -> Result<Self, P::Error> {
        let mut line = Self {
            pin,
            active,
            on: false,
        };
        line.write(false)?;
        Ok(line)
    }

    /// Turn the line on or off.
    ///
    /// The pin is only written when the logical state changes.
    pub fn set_active(&mut self, on: bool) -> Result<(), P::Error> {
        if on != self.on {
            self.write(on)?;
        }
        Ok(())
    }

    /// Current logical state.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.on
    }

    fn write(&mut self, on: bool) -> Result<(), P::Error> {
        self.pin.set_level(self.active.level_for(on))?;
        self.on = on;
        Ok(())
    }
}
