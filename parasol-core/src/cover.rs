//! Cover controller
//!
//! A [`Cover`] ties one estimator, one relay actuator and one subscriber
//! list together. It is the only type a host needs to hold per physical
//! cover: commands go in through [`Cover::request_position`] and friends,
//! time goes in through [`Cover::update_with_delta`], snapshots come out
//! through the subscribers.
//!
//! ```text
//!  command ──► Estimator ──► Outcome ──┬──► RelayActuator ──► outputs
//!                  ▲                   └──► Feedback ──► subscribers
//!  delta_ms ───────┴──────────────────────► PulseScheduler
//! ```

use heapless::String;

use crate::actuator::{RelayActuator, RelayHealth};
use crate::config::{ConfigError, CoverConfig, RelayRef, MAX_LABEL_LEN};
use crate::feedback::{Feedback, FeedbackError, PublishReport, SnapshotSubscriber};
use crate::motion::{Actuation, Estimator, MotionState, Outcome};
use crate::state::{PositionStatus, Snapshot, SymbolicCommand};
use crate::traits::{
    OpenCloseStop, OpenClosedFeedback, OutputResolver, PositionReporting, RaiseLowerFeedback,
    SwitchedOutput,
};

/// One relay-driven cover
pub struct Cover<'a, O> {
    name: String<MAX_LABEL_LEN>,
    estimator: Estimator,
    actuator: RelayActuator<O>,
    feedback: Feedback<'a>,
}

impl<'a, O: SwitchedOutput> Cover<'a, O> {
    /// Build a cover, resolving its relays through `resolver`
    ///
    /// Only an invalid config fails. A relay that does not resolve is
    /// logged and left out; see [`Cover::relay_health`].
    pub fn new<R>(config: &CoverConfig, resolver: &mut R) -> Result<Self, ConfigError>
    where
        R: OutputResolver<Output = O>,
    {
        config.validate()?;

        let open = resolve_relay(config, "open", &config.open, resolver);
        let close = resolve_relay(config, "close", &config.close, resolver);

        log_info!(
            "Cover {}: travel {} ms, sample {} ms, {}",
            config.name.as_str(),
            config.travel_ms,
            config.sample_interval_ms,
            config.stop_policy.as_str()
        );

        Ok(Self {
            name: config.name.clone(),
            estimator: Estimator::new(config),
            actuator: RelayActuator::new(open, close, config.pulse_width_ms, config.stop_policy),
            feedback: Feedback::new(),
        })
    }

    /// Cover name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Add a snapshot subscriber
    pub fn subscribe(
        &mut self,
        subscriber: &'a dyn SnapshotSubscriber,
    ) -> Result<(), FeedbackError> {
        self.feedback.subscribe(subscriber)
    }

    /// Estimator state
    pub fn state(&self) -> &MotionState {
        self.estimator.state()
    }

    /// Current estimate as a snapshot
    pub fn snapshot(&self) -> Snapshot {
        let state = self.estimator.state();
        Snapshot {
            status: state.status,
            current_percent: state.current_percent,
            pending_percent: state.pending_percent,
            remaining_ms: state.remaining_ms,
        }
    }

    /// Which relays resolved
    pub fn relay_health(&self) -> RelayHealth {
        self.actuator.health()
    }

    /// Relay actuator
    pub fn actuator(&self) -> &RelayActuator<O> {
        &self.actuator
    }

    /// Move toward a target percent
    ///
    /// Returns the delivery report when a snapshot was published.
    pub fn request_position(&mut self, target: u8) -> Option<PublishReport> {
        if target > 100 {
            log_warn!("{}: target {} clamped to 100", self.name.as_str(), target);
        }
        let outcome = self.estimator.request_position(target);
        self.apply(outcome)
    }

    /// Run a symbolic command
    pub fn request_symbolic(&mut self, command: SymbolicCommand) -> Option<PublishReport> {
        let target = self.estimator.resolve_command(command);
        log_info!(
            "{}: {} from {} -> {}",
            self.name.as_str(),
            command.as_str(),
            self.estimator.state().status.as_str(),
            target
        );
        self.request_position(target)
    }

    /// Record a fault reported by the host
    pub fn report_fault(&mut self) -> Option<PublishReport> {
        log_error!("{}: fault reported", self.name.as_str());
        let outcome = self.estimator.mark_error();
        self.apply(outcome)
    }

    /// Process one sample interval
    pub fn tick(&mut self) -> Option<PublishReport> {
        if self.estimator.tick() {
            Some(self.publish())
        } else {
            None
        }
    }

    /// Advance time by `delta_ms`
    ///
    /// Applies relay transitions that came due and runs every estimator
    /// tick that elapsed. Returns the number of ticks run.
    pub fn update_with_delta(&mut self, delta_ms: u32) -> u32 {
        self.actuator.update_with_delta(delta_ms);

        let due = self.estimator.advance_tick_timer(delta_ms);
        let mut ran = 0;
        while ran < due && self.estimator.is_ticking() {
            self.tick();
            ran += 1;
        }
        ran
    }

    /// Time until the cover next needs `update_with_delta`, if anything is
    /// pending
    pub fn next_deadline(&self) -> Option<u32> {
        match (self.estimator.next_tick_in(), self.actuator.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn apply(&mut self, outcome: Outcome) -> Option<PublishReport> {
        match outcome.actuation {
            Some(Actuation::Drive(direction)) => self.actuator.drive(direction),
            Some(Actuation::Stop { was }) => self.actuator.stop(was),
            None => {}
        }

        if outcome.emit {
            Some(self.publish())
        } else {
            None
        }
    }

    fn publish(&self) -> PublishReport {
        let snapshot = self.snapshot();
        log_trace!(
            "{}: {} at {}%, pending {}%, {} ms left",
            self.name.as_str(),
            snapshot.status.as_str(),
            snapshot.current_percent,
            snapshot.pending_percent,
            snapshot.remaining_ms
        );
        self.feedback.publish(&snapshot)
    }
}

fn resolve_relay<R: OutputResolver>(
    config: &CoverConfig,
    role: &str,
    relay: &RelayRef,
    resolver: &mut R,
) -> Option<R::Output> {
    match resolver.resolve(relay) {
        Ok(output) => Some(output),
        Err(err) => {
            log_warn!(
                "{}: {} relay {} port {} unavailable: {:?}",
                config.name.as_str(),
                role,
                relay.device_key.as_str(),
                relay.port_number,
                err
            );
            None
        }
    }
}

impl<O: SwitchedOutput> PositionReporting for Cover<'_, O> {
    fn percent_open(&self) -> u8 {
        self.estimator.state().current_percent
    }

    fn remaining_ms(&self) -> u32 {
        self.estimator.state().remaining_ms
    }

    fn status(&self) -> PositionStatus {
        self.estimator.state().status
    }
}

impl<O: SwitchedOutput> OpenCloseStop for Cover<'_, O> {
    fn open(&mut self) {
        self.request_symbolic(SymbolicCommand::Open);
    }

    fn close(&mut self) {
        self.request_symbolic(SymbolicCommand::Close);
    }

    fn stop(&mut self) {
        self.request_symbolic(SymbolicCommand::Stop);
    }
}

impl<O: SwitchedOutput> OpenClosedFeedback for Cover<'_, O> {
    fn is_open(&self) -> bool {
        self.status() == PositionStatus::Open
    }

    fn is_closed(&self) -> bool {
        self.status() == PositionStatus::Closed
    }
}

impl<O: SwitchedOutput> RaiseLowerFeedback for Cover<'_, O> {
    fn is_raising(&self) -> bool {
        self.status() == PositionStatus::Closing
    }

    fn is_lowering(&self) -> bool {
        self.status() == PositionStatus::Opening
    }
}
