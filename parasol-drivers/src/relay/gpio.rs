//! GPIO relay output
//!
//! Drives a relay coil from a GPIO pin, directly or through a transistor
//! or optocoupler board.

use parasol_core::traits::SwitchedOutput;
use parasol_hal::{Level, OutputPin};

/// GPIO relay output
///
/// The pin can be configured as active-high (default) or active-low. Most
/// opto-isolated relay boards are active-low.
pub struct GpioRelay<P> {
    pin: P,
    /// If true, relay energized = pin LOW
    inverted: bool,
    /// Current logical state (true = energized)
    on: bool,
}

impl<P: OutputPin> GpioRelay<P> {
    /// Create a new GPIO relay output
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the relay is energized when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut relay = Self {
            pin,
            inverted,
            on: false,
        };
        // Ensure the relay starts released
        relay.drive(false);
        relay
    }

    /// Create a new GPIO relay with active-high output
    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// Create a new GPIO relay with active-low output
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// The underlying pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    fn drive(&mut self, on: bool) {
        self.on = on;
        let level = if on {
            Level::asserted(self.inverted)
        } else {
            Level::asserted(self.inverted).inverted()
        };
        self.pin.set_level(level);
    }
}

impl<P: OutputPin> SwitchedOutput for GpioRelay<P> {
    fn on(&mut self) {
        if !self.on {
            self.drive(true);
        }
    }

    fn off(&mut self) {
        if self.on {
            self.drive(false);
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Mock GPIO pin for testing
    pub(crate) struct MockPin {
        pub high: bool,
        pub writes: u32,
    }

    impl MockPin {
        pub(crate) fn new() -> Self {
            Self {
                high: false,
                writes: 0,
            }
        }
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_active_high_relay() {
        let mut relay = GpioRelay::new_active_high(MockPin::new());

        // Initially released
        assert!(!relay.is_on());
        assert!(!relay.pin().is_set_high());

        relay.on();
        assert!(relay.is_on());
        assert!(relay.pin().is_set_high());

        relay.off();
        assert!(!relay.is_on());
        assert!(!relay.pin().is_set_high());
    }

    #[test]
    fn test_active_low_relay() {
        let mut relay = GpioRelay::new_active_low(MockPin::new());

        // Released means the pin idles high
        assert!(!relay.is_on());
        assert!(relay.pin().is_set_high());

        relay.on();
        assert!(relay.is_on());
        assert!(relay.pin().is_set_low());
    }

    #[test]
    fn test_repeated_commands_do_not_rewrite_pin() {
        let mut relay = GpioRelay::new_active_high(MockPin::new());
        let after_init = relay.pin().writes;

        relay.on();
        relay.on();
        relay.off();
        relay.off();
        assert_eq!(relay.pin().writes, after_init + 2);
    }
}
