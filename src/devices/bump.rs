//! Debounced bumper switch
//!
//! Normally-open switch to ground with a pull-up: the pin reads low while
//! the bumper is pressed.
//!
//! An edge is taken at once when the input has been quiet for longer than
//! the debounce interval, so the first contact is reported on the same
//! pass. Edges inside the interval are treated as bounce; if the input then
//! stays at a level different from the reported one for a full interval,
//! that level is taken.

use embedded_hal::digital::InputPin;

use super::traits::BumpSwitch;
use crate::core::error::DeviceError;
use crate::core::traits::time::{ticks_diff, Millis};

/// Default debounce interval
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Active-low bump switch with debounce
pub struct DebouncedBump<P: InputPin> {
    pin: P,
    debounce_ms: u32,
    last_raw: bool,
    last_edge: Option<Millis>,
    pressed: bool,
}

impl<P: InputPin> DebouncedBump<P> {
    /// Take the pin; its current level is the initial state
    pub fn new(pin: P) -> Result<Self, DeviceError> {
        Self::with_debounce(pin, DEFAULT_DEBOUNCE_MS)
    }

    /// Take the pin with a custom debounce interval
    pub fn with_debounce(mut pin: P, debounce_ms: u32) -> Result<Self, DeviceError> {
        let raw = pin.is_low().map_err(|_| DeviceError::Pin)?;
        Ok(Self {
            pin,
            debounce_ms,
            last_raw: raw,
            last_edge: None,
            pressed: raw,
        })
    }

    fn quiet_for(&self, now: Millis, interval: u32) -> bool {
        match self.last_edge {
            Some(edge) => ticks_diff(now, edge) > interval,
            None => true,
        }
    }
}

impl<P: InputPin> BumpSwitch for DebouncedBump<P> {
    fn pressed(&mut self, now: Millis) -> Result<bool, DeviceError> {
        let raw = self.pin.is_low().map_err(|_| DeviceError::Pin)?;

        if raw != self.last_raw {
            if self.quiet_for(now, self.debounce_ms) {
                self.pressed = raw;
            }
            self.last_edge = Some(now);
            self.last_raw = raw;
        } else if raw != self.pressed && self.quiet_for(now, self.debounce_ms.saturating_sub(1)) {
            self.pressed = raw;
        }

        Ok(self.pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct TestPin {
        low: bool,
    }

    impl embedded_hal::digital::ErrorType for TestPin {
        type Error = Infallible;
    }

    impl InputPin for TestPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(self.low)
        }
    }

    #[test]
    fn first_contact_reported_immediately() {
        let mut bump = DebouncedBump::new(TestPin { low: false }).unwrap();
        assert!(!bump.pressed(0).unwrap());
        bump.pin.low = true;
        assert!(bump.pressed(100).unwrap());
    }

    #[test]
    fn bounce_is_ignored() {
        let mut bump = DebouncedBump::new(TestPin { low: false }).unwrap();
        bump.pin.low = true;
        assert!(bump.pressed(100).unwrap());
        bump.pin.low = false;
        assert!(bump.pressed(105).unwrap());
        bump.pin.low = true;
        assert!(bump.pressed(110).unwrap());
        assert!(bump.pressed(200).unwrap());
    }

    #[test]
    fn settled_release_is_taken_after_interval() {
        let mut bump = DebouncedBump::new(TestPin { low: false }).unwrap();
        bump.pin.low = true;
        assert!(bump.pressed(100).unwrap());
        bump.pin.low = false;
        assert!(bump.pressed(120).unwrap());
        assert!(bump.pressed(150).unwrap());
        assert!(!bump.pressed(170).unwrap());
    }

    #[test]
    fn starts_from_pin_level() {
        let mut bump = DebouncedBump::with_debounce(TestPin { low: true }, 20).unwrap();
        assert!(bump.pressed(0).unwrap());
    }
}
