//! Property tests for the position estimator
//!
//! Drives a cover with arbitrary command and time sequences and checks the
//! state after every step.

use parasol_core::config::{CoverConfig, RelayRef};
use parasol_core::motion::MotionState;
use parasol_core::state::{PositionStatus, SymbolicCommand};
use parasol_core::traits::{OutputResolver, ResolveError, SwitchedOutput};
use parasol_core::Cover;
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Coil {
    energized: bool,
}

impl SwitchedOutput for Coil {
    fn on(&mut self) {
        self.energized = true;
    }

    fn off(&mut self) {
        self.energized = false;
    }

    fn is_on(&self) -> bool {
        self.energized
    }
}

struct Bench;

impl OutputResolver for Bench {
    type Output = Coil;

    fn resolve(&mut self, _relay: &RelayRef) -> Result<Coil, ResolveError> {
        Ok(Coil::default())
    }
}

#[derive(Debug, Clone)]
enum Op {
    Request(u8),
    Symbolic(SymbolicCommand),
    Advance(u32),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..=120).prop_map(Op::Request),
        prop_oneof![
            Just(SymbolicCommand::Open),
            Just(SymbolicCommand::Close),
            Just(SymbolicCommand::Stop),
            Just(SymbolicCommand::Toggle),
        ]
        .prop_map(Op::Symbolic),
        (0u32..=2_000).prop_map(Op::Advance),
        Just(Op::Tick),
    ]
}

fn config() -> impl Strategy<Value = CoverConfig> {
    // travel = sample * samples keeps every sample worth at least 1 %
    (20u32..=500, 1u32..=100, 0u32..=1_000).prop_map(|(sample, samples, settle)| {
        CoverConfig::new(
            "prop",
            RelayRef::new("bench", 1).unwrap(),
            RelayRef::new("bench", 2).unwrap(),
        )
        .unwrap()
        .with_travel_ms(sample * samples)
        .with_sample_interval_ms(sample)
        .with_direction_change_ms(settle)
    })
}

fn check_invariants(config: &CoverConfig, state: &MotionState) {
    assert!(state.current_percent <= 100);
    assert!(state.pending_percent <= 100);

    match state.status {
        PositionStatus::Opening | PositionStatus::Closing => {
            let gap = u32::from(state.current_percent.abs_diff(state.pending_percent));
            assert_eq!(state.remaining_ms, config.travel_ms * gap / 100);
            assert!(state.tick.is_some());
        }
        PositionStatus::Open | PositionStatus::Closed | PositionStatus::Stopped => {
            assert_eq!(state.remaining_ms, 0);
            assert!(state.tick.is_none());
        }
        PositionStatus::Unknown | PositionStatus::Error => {}
    }
}

fn apply(cover: &mut Cover<'_, Coil>, op: &Op) {
    match op {
        Op::Request(target) => {
            cover.request_position(*target);
        }
        Op::Symbolic(command) => {
            cover.request_symbolic(*command);
        }
        Op::Advance(delta) => {
            cover.update_with_delta(*delta);
        }
        Op::Tick => {
            cover.tick();
        }
    }
}

proptest! {
    #[test]
    fn state_stays_in_bounds(config in config(), ops in prop::collection::vec(op(), 1..60)) {
        let mut cover = Cover::new(&config, &mut Bench).unwrap();
        check_invariants(&config, cover.state());

        for op in &ops {
            apply(&mut cover, op);
            check_invariants(&config, cover.state());
        }
    }

    #[test]
    fn stop_at_current_is_terminal(config in config(), ops in prop::collection::vec(op(), 0..40)) {
        let mut cover = Cover::new(&config, &mut Bench).unwrap();
        for op in &ops {
            apply(&mut cover, op);
        }

        // At an endpoint a same-position request re-drives toward that end
        let current = cover.state().current_percent;
        if current == 0 || current == 100 {
            return Ok(());
        }
        cover.request_position(current);

        let state = cover.state();
        prop_assert!(state.tick.is_none());
        prop_assert_eq!(state.remaining_ms, 0);
        prop_assert!(state.status.is_terminal());
        prop_assert_eq!(state.current_percent, current);
    }

    #[test]
    fn opening_never_moves_down(
        config in config(),
        start in 0u8..=100,
        target in 0u8..=100,
        deltas in prop::collection::vec(1u32..=3_000, 1..80),
    ) {
        let mut cover = Cover::new(&config, &mut Bench).unwrap();

        // Park at `start`, then run toward `target` uninterrupted
        cover.request_position(start);
        while cover.state().tick.is_some() {
            cover.update_with_delta(config.sample_interval_ms);
        }
        cover.request_position(target);
        let status = cover.state().status;

        let mut last = cover.state().current_percent;
        for delta in deltas {
            cover.update_with_delta(delta);
            let current = cover.state().current_percent;
            match status {
                PositionStatus::Opening => {
                    prop_assert!(current >= last);
                }
                PositionStatus::Closing => {
                    prop_assert!(current <= last);
                }
                _ => {
                    prop_assert_eq!(current, last);
                }
            }
            last = current;
            if cover.state().tick.is_none() {
                break;
            }
        }
    }
}
