//! Push button on a pulled-up input
//!
//! The pin reads high at rest and low while pressed. A press is reported
//! once, on release, and classified by how long it was held. Contact bounce
//! is not filtered here; poll at a rate slower than the switch bounces.

use embedded_hal::digital::InputPin;

/// Hold time from which a press counts as long
pub const LONG_PRESS_MS: u64 = 1000;

/// Completed press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Press {
    Short,
    Long,
}

/// Release-edge detector
pub struct Button<P> {
    pin: P,
    pressed_since_ms: Option<u64>,
}

impl<P: InputPin> Button<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pressed_since_ms: None,
        }
    }

    /// Sample the pin, returning the press that ended with a low to high
    /// transition
    pub fn poll(&mut self, now_ms: u64) -> Result<Option<Press>, P::Error> {
        let high = self.pin.is_high()?;
        match (high, self.pressed_since_ms) {
            (false, None) => {
                self.pressed_since_ms = Some(now_ms);
                Ok(None)
            }
            (true, Some(since_ms)) => {
                self.pressed_since_ms = None;
                if now_ms.saturating_sub(since_ms) >= LONG_PRESS_MS {
                    Ok(Some(Press::Long))
                } else {
                    Ok(Some(Press::Short))
                }
            }
            _ => Ok(None),
        }
    }

    /// Check if the button is held down right now
    pub fn is_pressed(&mut self) -> Result<bool, P::Error> {
        self.pin.is_low()
    }
}
