//! GPIO bindings for station inputs and outputs.
//!
//! Pins are downgraded to `AnyIOPin` / `AnyOutputPin` so that every input
//! and every output of the station share one type, as
//! [`Station`](crate::Station) requires.

use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver, Pull};
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::sys::EspError;

use crate::traits::{ActiveLevel, DigitalInput, DigitalOutput};

/// Button, line or selector sense input.
///
/// # Example
///
/// ```ignore
/// use esp_idf_hal::gpio::IOPin;
/// use rs_sounder::hal::esp32::Esp32Input;
/// use rs_sounder::traits::ActiveLevel;
///
/// let regular = Esp32Input::new(peripherals.pins.gpio32.downgrade(), ActiveLevel::Low)?;
/// ```
pub struct Esp32Input<'d> {
    pin: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> Esp32Input<'d> {
    /// Configure `pin` as an input, pulled to its inactive level.
    pub fn new(
        pin: impl Peripheral<P = AnyIOPin> + 'd,
        active: ActiveLevel,
    ) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(match active {
            ActiveLevel::Low => Pull::Up,
            ActiveLevel::High => Pull::Down,
        })?;
        Ok(Self { pin })
    }
}

impl DigitalInput for Esp32Input<'_> {
    #[inline]
    fn is_high(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Sounder, busy, lamp or selector scan output.
pub struct Esp32Output<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> Esp32Output<'d> {
    /// Configure `pin` as a push-pull output.
    pub fn new(pin: impl Peripheral<P = AnyOutputPin> + 'd) -> Result<Self, EspError> {
        Ok(Self {
            pin: PinDriver::output(pin)?,
        })
    }
}

impl DigitalOutput for Esp32Output<'_> {
    type Error = EspError;

    fn set_level(&mut self, high: bool) -> Result<(), EspError> {
        if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}
