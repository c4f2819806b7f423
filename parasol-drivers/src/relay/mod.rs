//! Relay outputs

pub mod bank;
pub mod gpio;

pub use bank::{RelayBank, MAX_BANK_PINS};
pub use gpio::GpioRelay;
