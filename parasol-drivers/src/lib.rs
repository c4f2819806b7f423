//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in parasol-core and parasol-hal:
//!
//! - Relay outputs over GPIO pins (active-high or active-low coils)
//! - Relay bank resolving configured device ports to relay outputs
//! - Debounced push-button input
//! - Adapter from `embedded-hal` 1.0 pins to the parasol-hal traits

#![no_std]
#![deny(unsafe_code)]

pub mod input;
pub mod pin;
pub mod relay;

pub use input::DebouncedButton;
pub use pin::HalPin;
pub use relay::{GpioRelay, RelayBank};
