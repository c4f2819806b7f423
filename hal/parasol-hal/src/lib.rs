//! Parasol Hardware Abstraction Layer
//!
//! This crate defines the digital I/O traits that relay drivers are written
//! against. Chip-specific code (the RP2040 firmware, host test mocks)
//! implements them, so the same relay driver runs everywhere.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  parasol-firmware / host tests          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  parasol-drivers (GpioRelay, RelayBank) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  parasol-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

pub use gpio::{InputPin, Level, OutputPin};
