//! `embedded-hal` adapter
//!
//! Wraps any infallible `embedded-hal` 1.0 output so it can drive a
//! [`crate::GpioRelay`]. The wrapper remembers the level it last drove,
//! since `embedded-hal` state reads need `&mut self`.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin as EhOutputPin;
use parasol_hal::{Level, OutputPin};

/// `embedded-hal` output pin as a parasol-hal [`OutputPin`]
pub struct HalPin<P> {
    pin: P,
    level: Level,
}

impl<P: EhOutputPin<Error = Infallible>> HalPin<P> {
    /// Wrap a pin, driving it to `initial`
    pub fn new(pin: P, initial: Level) -> Self {
        let mut wrapped = Self {
            pin,
            level: initial,
        };
        wrapped.set_level(initial);
        wrapped
    }

    /// Recover the wrapped pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin<Error = Infallible>> OutputPin for HalPin<P> {
    fn set_high(&mut self) {
        settle(self.pin.set_high());
        self.level = Level::High;
    }

    fn set_low(&mut self) {
        settle(self.pin.set_low());
        self.level = Level::Low;
    }

    fn is_set_high(&self) -> bool {
        self.level == Level::High
    }
}

fn settle(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}
