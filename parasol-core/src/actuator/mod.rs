//! Relay actuation
//!
//! Turns drive and stop decisions into timed relay transitions. Nothing
//! here blocks: a pulse energizes its relay immediately and leaves the
//! de-energize transition on the [`PulseScheduler`] timeline, which the
//! owner advances with `update_with_delta`.

pub mod pulse;
pub mod relay;

pub use pulse::{PulseHandle, PulseScheduler, ScheduleError, MAX_SCHEDULED};
pub use relay::{Relay, RelayActuator, RelayHealth};
