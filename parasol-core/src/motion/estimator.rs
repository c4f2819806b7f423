//! Position estimator state machine
//!
//! The estimator has no position sensor. It assumes the motor covers the
//! full range in `travel_ms` at constant speed and advances the estimate by
//! a fixed number of percent on every tick while a run is active.
//!
//! Every request returns an [`Outcome`]: which relay action the caller must
//! perform and whether a snapshot is due. The estimator never touches
//! hardware itself.

use crate::config::CoverConfig;
use crate::state::{PositionStatus, SymbolicCommand};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Drive direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    /// The other direction
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Open => Direction::Close,
            Direction::Close => Direction::Open,
        }
    }

    /// Status while moving in this direction
    pub const fn moving_status(self) -> PositionStatus {
        match self {
            Direction::Open => PositionStatus::Opening,
            Direction::Close => PositionStatus::Closing,
        }
    }

    /// Status on reaching this direction's end of travel
    pub const fn endpoint_status(self) -> PositionStatus {
        match self {
            Direction::Open => PositionStatus::Open,
            Direction::Close => PositionStatus::Closed,
        }
    }

    /// Percent at this direction's end of travel
    pub const fn endpoint(self) -> u8 {
        match self {
            Direction::Open => 100,
            Direction::Close => 0,
        }
    }

    /// Direction a status is moving in, if any
    pub const fn of(status: PositionStatus) -> Option<Self> {
        match status {
            PositionStatus::Opening => Some(Direction::Open),
            PositionStatus::Closing => Some(Direction::Close),
            _ => None,
        }
    }
}

/// Relay action requested by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Actuation {
    /// Start driving in a direction
    Drive(Direction),
    /// Apply the stop policy; `was` is the direction that was active
    Stop { was: Option<Direction> },
}

/// Result of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    pub actuation: Option<Actuation>,
    /// A snapshot must be published
    pub emit: bool,
}

impl Outcome {
    const fn quiet() -> Self {
        Self {
            actuation: None,
            emit: false,
        }
    }

    const fn emitting(actuation: Option<Actuation>) -> Self {
        Self {
            actuation,
            emit: true,
        }
    }
}

/// Periodic tick resource
///
/// Exists only while a run is active. Accumulates elapsed time toward the
/// next sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickTimer {
    elapsed_ms: u32,
}

impl TickTimer {
    /// Time accumulated toward the next sample
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

/// Estimator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionState {
    /// Estimated percent open
    pub current_percent: u8,
    /// Target of the run in flight
    pub pending_percent: u8,
    /// Estimated time to reach the target (ms)
    pub remaining_ms: u32,
    pub status: PositionStatus,
    /// Settling time left before position starts changing (ms)
    pub direction_change_remaining_ms: u32,
    /// Present only while a run is active
    pub tick: Option<TickTimer>,
}

/// Position estimator for one cover
#[derive(Debug, Clone)]
pub struct Estimator {
    sample_interval_ms: u32,
    travel_ms: u32,
    direction_change_ms: u32,
    sample_percent: u8,
    state: MotionState,
}

impl Estimator {
    /// Create an estimator at the closed end with unknown status
    pub fn new(config: &CoverConfig) -> Self {
        Self {
            sample_interval_ms: config.sample_interval_ms,
            travel_ms: config.travel_ms,
            direction_change_ms: config.direction_change_ms,
            sample_percent: config.sample_percent(),
            state: MotionState::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Percent covered per tick
    pub fn sample_percent(&self) -> u8 {
        self.sample_percent
    }

    /// Tick period (ms)
    pub fn sample_interval_ms(&self) -> u32 {
        self.sample_interval_ms
    }

    /// Whether a run is active
    pub fn is_ticking(&self) -> bool {
        self.state.tick.is_some()
    }

    /// Time until the next tick is due, if a run is active
    pub fn next_tick_in(&self) -> Option<u32> {
        self.state
            .tick
            .map(|t| self.sample_interval_ms.saturating_sub(t.elapsed_ms))
    }

    /// Request a target position (0..=100, larger values clamp to 100)
    pub fn request_position(&mut self, target: u8) -> Outcome {
        let target = target.min(100);
        let current = self.state.current_percent;
        self.state.pending_percent = target;

        if target == 0 || target < current {
            self.run(Direction::Close)
        } else if target == 100 || target > current {
            self.run(Direction::Open)
        } else {
            self.stop_here()
        }
    }

    /// Resolve a symbolic command to a target position
    pub fn resolve_command(&self, command: SymbolicCommand) -> u8 {
        match command {
            SymbolicCommand::Open => 100,
            SymbolicCommand::Close => 0,
            SymbolicCommand::Stop => self.state.current_percent,
            SymbolicCommand::Toggle => self.toggle_target(),
        }
    }

    /// Target a toggle press moves toward
    ///
    /// An endpoint cover heads for the other end. A cover moving or
    /// stopped mid-travel heads away from its last target.
    pub fn toggle_target(&self) -> u8 {
        let current = self.state.current_percent;
        let pending = self.state.pending_percent;

        if current == 0 {
            100
        } else if current == 100 {
            0
        } else if pending == 0 {
            100
        } else if pending == 100 {
            0
        } else if pending < current {
            100
        } else if pending > current {
            0
        } else {
            100
        }
    }

    /// Accumulate elapsed time on the tick timer
    ///
    /// Returns how many ticks became due. Returns 0 when no run is active.
    pub fn advance_tick_timer(&mut self, delta_ms: u32) -> u32 {
        let interval = self.sample_interval_ms.max(1);
        match self.state.tick.as_mut() {
            Some(timer) => {
                let total = timer.elapsed_ms.saturating_add(delta_ms);
                timer.elapsed_ms = total % interval;
                total / interval
            }
            None => 0,
        }
    }

    /// Advance the estimate by one sample interval
    ///
    /// Returns true when a snapshot must be published. Without an active
    /// run nothing changes and nothing is published.
    pub fn tick(&mut self) -> bool {
        if self.state.tick.is_none() {
            log_debug!("Tick without an active run");
            return false;
        }

        if self.state.direction_change_remaining_ms > 0 {
            self.state.direction_change_remaining_ms = self
                .state
                .direction_change_remaining_ms
                .saturating_sub(self.sample_interval_ms);
            return true;
        }

        match Direction::of(self.state.status) {
            Some(Direction::Close) => {
                let current = self.state.current_percent.saturating_sub(self.sample_percent);
                self.state.current_percent = current;
                if current == 0 {
                    self.finish(PositionStatus::Closed);
                } else if current <= self.state.pending_percent {
                    self.finish(PositionStatus::Stopped);
                } else {
                    self.state.remaining_ms = self.remaining_for(current - self.state.pending_percent);
                }
            }
            Some(Direction::Open) => {
                let current = self
                    .state
                    .current_percent
                    .saturating_add(self.sample_percent)
                    .min(100);
                self.state.current_percent = current;
                if current == 100 {
                    self.finish(PositionStatus::Open);
                } else if current >= self.state.pending_percent {
                    self.finish(PositionStatus::Stopped);
                } else {
                    self.state.remaining_ms = self.remaining_for(self.state.pending_percent - current);
                }
            }
            None => {
                log_warn!(
                    "Tick in unexpected status {}, current {}, pending {}",
                    self.state.status.as_str(),
                    self.state.current_percent,
                    self.state.pending_percent
                );
                self.release_tick();
            }
        }

        true
    }

    /// Record a fault reported by the host
    ///
    /// The next tick of an active run sees the unexpected status and
    /// releases the tick.
    pub fn mark_error(&mut self) -> Outcome {
        if self.state.status == PositionStatus::Error {
            return Outcome::quiet();
        }
        self.state.status = PositionStatus::Error;
        Outcome::emitting(None)
    }

    fn run(&mut self, direction: Direction) -> Outcome {
        let moving = direction.moving_status();
        let current = self.state.current_percent;
        let pending = self.state.pending_percent;

        if self.state.status == moving {
            log_info!(
                "{} already running, current {}, pending {}",
                moving.as_str(),
                current,
                pending
            );
            let endpoint = direction.endpoint();
            if pending == endpoint && current == endpoint {
                self.finish(direction.endpoint_status());
                return Outcome::emitting(None);
            }
            self.state.remaining_ms = self.remaining_for(current.abs_diff(pending));
            return Outcome::quiet();
        }

        let reversing = self.state.status == direction.opposite().moving_status();
        self.state.direction_change_remaining_ms = if reversing {
            self.direction_change_ms.saturating_mul(2)
        } else {
            self.direction_change_ms
        };
        self.state.status = moving;
        self.state.remaining_ms = self.remaining_for(current.abs_diff(pending));
        // Starting a run always restarts the sample period
        self.state.tick = Some(TickTimer::default());

        log_debug!(
            "{} starting, current {}, pending {}",
            moving.as_str(),
            current,
            pending
        );
        Outcome::emitting(Some(Actuation::Drive(direction)))
    }

    fn stop_here(&mut self) -> Outcome {
        let was = Direction::of(self.state.status);
        let current = self.state.pending_percent;

        self.state.current_percent = current;
        self.state.remaining_ms = 0;
        self.state.direction_change_remaining_ms = 0;
        self.state.status = if current <= self.sample_percent {
            PositionStatus::Closed
        } else if current >= 100u8.saturating_sub(self.sample_percent) {
            PositionStatus::Open
        } else {
            PositionStatus::Stopped
        };
        self.release_tick();

        log_debug!("Stopped at {} as {}", current, self.state.status.as_str());
        Outcome::emitting(Some(Actuation::Stop { was }))
    }

    fn finish(&mut self, status: PositionStatus) {
        self.state.status = status;
        self.state.remaining_ms = 0;
        self.state.direction_change_remaining_ms = 0;
        self.release_tick();
    }

    fn release_tick(&mut self) {
        self.state.tick = None;
    }

    fn remaining_for(&self, percent: u8) -> u32 {
        self.travel_ms * u32::from(percent) / 100
    }
}
