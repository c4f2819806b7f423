//! Relay actuator
//!
//! Owns a cover's open and close outputs and applies pulses and the stop
//! policy to them. A missing output (failed resolution) turns every action
//! on that relay into a no-op.

use super::pulse::PulseScheduler;
use crate::config::StopPolicy;
use crate::motion::Direction;
use crate::traits::SwitchedOutput;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which of a cover's relays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Relay {
    Open,
    Close,
}

impl Relay {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Relay::Open => "open",
            Relay::Close => "close",
        }
    }
}

impl From<Direction> for Relay {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Open => Relay::Open,
            Direction::Close => Relay::Close,
        }
    }
}

/// Which relays resolved to real outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelayHealth {
    pub open: bool,
    pub close: bool,
}

impl RelayHealth {
    /// Both relays are present
    pub const fn is_complete(&self) -> bool {
        self.open && self.close
    }
}

/// Drives a cover's relays
#[derive(Debug)]
pub struct RelayActuator<O> {
    open: Option<O>,
    close: Option<O>,
    pulse_width_ms: u32,
    stop_policy: StopPolicy,
    scheduler: PulseScheduler,
}

impl<O: SwitchedOutput> RelayActuator<O> {
    /// Create an actuator; either output may be absent
    pub fn new(
        open: Option<O>,
        close: Option<O>,
        pulse_width_ms: u32,
        stop_policy: StopPolicy,
    ) -> Self {
        Self {
            open,
            close,
            pulse_width_ms,
            stop_policy,
            scheduler: PulseScheduler::new(),
        }
    }

    /// Output behind a relay, if it resolved
    pub fn output(&self, relay: Relay) -> Option<&O> {
        match relay {
            Relay::Open => self.open.as_ref(),
            Relay::Close => self.close.as_ref(),
        }
    }

    fn output_mut(&mut self, relay: Relay) -> Option<&mut O> {
        match relay {
            Relay::Open => self.open.as_mut(),
            Relay::Close => self.close.as_mut(),
        }
    }

    /// Which relays are present
    pub fn health(&self) -> RelayHealth {
        RelayHealth {
            open: self.open.is_some(),
            close: self.close.is_some(),
        }
    }

    /// Configured stop policy
    pub fn stop_policy(&self) -> StopPolicy {
        self.stop_policy
    }

    /// Pending transition timeline
    pub fn scheduler(&self) -> &PulseScheduler {
        &self.scheduler
    }

    /// Energize now, de-energize after the pulse width
    pub fn pulse(&mut self, relay: Relay) {
        self.pulse_pattern(relay, 1);
    }

    /// Two pulses back to back: on, off at w, on at 2w, off at 3w
    pub fn double_pulse(&mut self, relay: Relay) {
        self.pulse_pattern(relay, 2);
    }

    /// Start driving in a direction
    ///
    /// The opposite relay is released first so only one direction is ever
    /// driven.
    pub fn drive(&mut self, direction: Direction) {
        let relay = Relay::from(direction);
        self.release(Relay::from(direction.opposite()));

        log_info!("Pulse {} relay", relay.as_str());
        match self.stop_policy {
            StopPolicy::OppositeDirection => self.double_pulse(relay),
            StopPolicy::Stop | StopPolicy::OpenAndClose => self.pulse(relay),
        }
    }

    /// Apply the stop policy after a run in direction `was`
    ///
    /// The relay that was driving is released first, so nothing left of
    /// its start pattern fires after the stop.
    pub fn stop(&mut self, was: Option<Direction>) {
        if let Some(direction) = was {
            self.release(Relay::from(direction));
        }

        match self.stop_policy {
            StopPolicy::Stop => {}
            StopPolicy::OppositeDirection => {
                if let Some(direction) = was {
                    let relay = Relay::from(direction.opposite());
                    log_info!("Stop pulse on {} relay", relay.as_str());
                    self.pulse(relay);
                }
            }
            StopPolicy::OpenAndClose => {
                log_info!("Stop pulse on both relays");
                self.pulse(Relay::Open);
                self.pulse(Relay::Close);
            }
        }
    }

    /// Time until the next relay transition, if any
    pub fn next_deadline(&self) -> Option<u32> {
        self.scheduler.next_deadline()
    }

    /// Advance the pulse timeline
    pub fn update_with_delta(&mut self, delta_ms: u32) {
        let Self {
            open,
            close,
            scheduler,
            ..
        } = self;

        scheduler.update_with_delta(delta_ms, |relay, on| {
            let output = match relay {
                Relay::Open => open.as_mut(),
                Relay::Close => close.as_mut(),
            };
            if let Some(output) = output {
                switch(output, on);
            }
        });
    }

    fn pulse_pattern(&mut self, relay: Relay, count: u32) {
        let width = self.pulse_width_ms;
        let Some(output) = self.output_mut(relay) else {
            log_debug!("No {} relay, pulse skipped", relay.as_str());
            return;
        };
        output.on();

        // A fresh pulse supersedes whatever was left of the previous one
        self.scheduler.cancel_relay(relay);

        let mut step = 1;
        let last = count * 2 - 1;
        while step <= last {
            let on = step % 2 == 0;
            if let Err(err) = self.scheduler.schedule(relay, on, width.saturating_mul(step)) {
                log_error!("Dropped {} relay transition: {:?}", relay.as_str(), err);
                self.release(relay);
                return;
            }
            step += 1;
        }
    }

    fn release(&mut self, relay: Relay) {
        self.scheduler.cancel_relay(relay);
        if let Some(output) = self.output_mut(relay) {
            output.off();
        }
    }
}

fn switch<O: SwitchedOutput>(output: &mut O, on: bool) {
    if on {
        output.on();
    } else {
        output.off();
    }
}
