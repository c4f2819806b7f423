//! GPIO pin abstractions
//!
//! Relay coils and push-buttons are the only I/O a cover controller needs,
//! so this is deliberately small.

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level that asserts a signal with the given polarity
    pub const fn asserted(active_low: bool) -> Self {
        if active_low {
            Level::Low
        } else {
            Level::High
        }
    }

    /// The opposite level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch {
        high: bool,
    }

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_set_level_drives_pin() {
        let mut pin = Latch { high: false };

        pin.set_level(Level::High);
        assert!(pin.is_set_high());

        pin.set_level(Level::Low);
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_asserted_level_follows_polarity() {
        assert_eq!(Level::asserted(false), Level::High);
        assert_eq!(Level::asserted(true), Level::Low);
        assert_eq!(Level::High.inverted(), Level::Low);
        assert_eq!(Level::from(true), Level::High);
    }
}
