//! Board-agnostic core logic for the cover controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Configuration types, defaults and the TOML-subset parser
//! - Relay output and feedback capability traits
//! - Position estimation state machine
//! - Relay pulse scheduling and stop policies
//! - Snapshot fan-out to subscribers
//!
//! Nothing here reads a clock. Time is fed in by the caller through
//! [`cover::Cover::update_with_delta`], which keeps every behavior
//! reproducible in host tests.

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod actuator;
pub mod config;
pub mod cover;
pub mod feedback;
pub mod motion;
pub mod state;
pub mod traits;

pub use cover::Cover;
