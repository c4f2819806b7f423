//! Position estimation
//!
//! Time-based estimate of where a cover is, with direction-reversal
//! compensation.

pub mod estimator;

pub use estimator::{Actuation, Direction, Estimator, MotionState, Outcome, TickTimer};
