//! Board pin allocation
//!
//! Every RP2040 GPIO is handed out at most once, by number, so the pin
//! map can come from covers.toml instead of being fixed at compile time.

use defmt::*;
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::{Peri, Peripherals};

use parasol_core::config::PinConfig;
use parasol_core::Cover;
use parasol_drivers::{GpioRelay, HalPin};

/// GPIOs exposed by the RP2040
pub const GPIO_COUNT: usize = 30;

/// Board output pin
pub type BoardPin = HalPin<Output<'static>>;

/// Relay output on a board pin
pub type BoardRelay = GpioRelay<BoardPin>;

/// Cover driving board relays
pub type BoardCover = Cover<'static, BoardRelay>;

/// Unclaimed GPIOs
pub struct Board {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

macro_rules! gpio_bank {
    ($p:ident: $($pin:ident),* $(,)?) => {
        [$(Some($p.$pin.into())),*]
    };
}

impl Board {
    /// Take the GPIO bank out of the peripherals
    pub fn new(p: Peripherals) -> Self {
        Self {
            pins: gpio_bank!(p:
                PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9,
                PIN_10, PIN_11, PIN_12, PIN_13, PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19,
                PIN_20, PIN_21, PIN_22, PIN_23, PIN_24, PIN_25, PIN_26, PIN_27, PIN_28, PIN_29,
            ),
        }
    }

    fn take(&mut self, gpio: u8) -> Option<Peri<'static, AnyPin>> {
        let pin = self.pins.get_mut(usize::from(gpio))?.take();
        if pin.is_none() {
            warn!("GPIO{} is unavailable", gpio);
        }
        pin
    }

    /// Claim a GPIO as a push-pull output, driven low
    pub fn take_output(&mut self, gpio: u8) -> Option<BoardPin> {
        let pin = self.take(gpio)?;
        Some(HalPin::new(
            Output::new(pin, Level::Low),
            parasol_hal::Level::Low,
        ))
    }

    /// Claim a GPIO as an input
    pub fn take_input(&mut self, config: &PinConfig) -> Option<BoardInput> {
        let pin = self.take(config.pin)?;
        let pull = if config.pull_up { Pull::Up } else { Pull::None };
        Some(BoardInput(Input::new(pin, pull)))
    }
}

/// Board input as a parasol-hal [`parasol_hal::InputPin`]
pub struct BoardInput(Input<'static>);

impl parasol_hal::InputPin for BoardInput {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
