//! One-shot delayed relay transitions

use heapless::Vec;

use super::relay::Relay;

/// Maximum transitions in flight per cover
///
/// A double pulse leaves three pending transitions on one relay, and a new
/// pulse on a relay cancels that relay's stale ones, so two relays never
/// need more than six.
pub const MAX_SCHEDULED: usize = 8;

/// Scheduling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScheduleError {
    /// No room for another transition
    Full,
}

/// Cancellable reference to a scheduled transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseHandle(u32);

#[derive(Debug, Clone, Copy)]
struct ScheduledSwitch {
    due_ms: u64,
    relay: Relay,
    on: bool,
    handle: PulseHandle,
}

/// Timeline of pending relay transitions
///
/// Transitions due at the same instant are applied in the order they were
/// scheduled.
#[derive(Debug, Clone, Default)]
pub struct PulseScheduler {
    now_ms: u64,
    next_handle: u32,
    pending: Vec<ScheduledSwitch, MAX_SCHEDULED>,
}

impl PulseScheduler {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a relay transition `delay_ms` from now
    pub fn schedule(
        &mut self,
        relay: Relay,
        on: bool,
        delay_ms: u32,
    ) -> Result<PulseHandle, ScheduleError> {
        let handle = PulseHandle(self.next_handle);
        self.pending
            .push(ScheduledSwitch {
                due_ms: self.now_ms + u64::from(delay_ms),
                relay,
                on,
                handle,
            })
            .map_err(|_| ScheduleError::Full)?;
        self.next_handle = self.next_handle.wrapping_add(1);
        Ok(handle)
    }

    /// Cancel a transition
    ///
    /// Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: PulseHandle) -> bool {
        match self.pending.iter().position(|s| s.handle == handle) {
            Some(index) => {
                self.pending.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending transition on a relay
    pub fn cancel_relay(&mut self, relay: Relay) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.relay != relay);
        before - self.pending.len()
    }

    /// Number of pending transitions on a relay
    pub fn pending_for(&self, relay: Relay) -> usize {
        self.pending.iter().filter(|s| s.relay == relay).count()
    }

    /// Time until the next transition is due, if any
    pub fn next_deadline(&self) -> Option<u32> {
        self.pending
            .iter()
            .map(|s| s.due_ms.saturating_sub(self.now_ms))
            .min()
            .map(|ms| ms.min(u64::from(u32::MAX)) as u32)
    }

    /// Advance time and apply every transition that became due
    pub fn update_with_delta(&mut self, delta_ms: u32, mut apply: impl FnMut(Relay, bool)) {
        self.now_ms += u64::from(delta_ms);

        while let Some(index) = self.next_due() {
            let switch = self.pending.swap_remove(index);
            apply(switch.relay, switch.on);
        }
    }

    fn next_due(&self) -> Option<usize> {
        let now = self.now_ms;
        let next_handle = self.next_handle;
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= now)
            // Handle age orders ties; wrapping_sub keeps that valid across wrap
            .min_by_key(|(_, s)| (s.due_ms, s.handle.0.wrapping_sub(next_handle)))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut PulseScheduler, delta_ms: u32) -> Vec<(Relay, bool), MAX_SCHEDULED> {
        let mut applied = Vec::new();
        scheduler.update_with_delta(delta_ms, |relay, on| applied.push((relay, on)).unwrap());
        applied
    }

    #[test]
    fn test_fires_when_due() {
        let mut scheduler = PulseScheduler::new();
        scheduler.schedule(Relay::Open, false, 500).unwrap();

        assert!(drain(&mut scheduler, 499).is_empty());
        assert_eq!(scheduler.next_deadline(), Some(1));
        assert_eq!(drain(&mut scheduler, 1).as_slice(), &[(Relay::Open, false)]);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_fires_in_time_then_schedule_order() {
        let mut scheduler = PulseScheduler::new();
        scheduler.schedule(Relay::Open, false, 300).unwrap();
        scheduler.schedule(Relay::Close, true, 100).unwrap();
        scheduler.schedule(Relay::Close, false, 300).unwrap();

        assert_eq!(
            drain(&mut scheduler, 1_000).as_slice(),
            &[
                (Relay::Close, true),
                (Relay::Open, false),
                (Relay::Close, false)
            ]
        );
    }

    #[test]
    fn test_cancel_handle() {
        let mut scheduler = PulseScheduler::new();
        let handle = scheduler.schedule(Relay::Open, false, 100).unwrap();

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(drain(&mut scheduler, 200).is_empty());
    }

    #[test]
    fn test_cancel_relay_leaves_other_relay() {
        let mut scheduler = PulseScheduler::new();
        scheduler.schedule(Relay::Open, false, 100).unwrap();
        scheduler.schedule(Relay::Open, true, 200).unwrap();
        scheduler.schedule(Relay::Close, false, 100).unwrap();

        assert_eq!(scheduler.cancel_relay(Relay::Open), 2);
        assert_eq!(scheduler.pending_for(Relay::Close), 1);
        assert_eq!(drain(&mut scheduler, 500).as_slice(), &[(Relay::Close, false)]);
    }

    #[test]
    fn test_full() {
        let mut scheduler = PulseScheduler::new();
        for _ in 0..MAX_SCHEDULED {
            scheduler.schedule(Relay::Open, false, 10).unwrap();
        }
        assert_eq!(
            scheduler.schedule(Relay::Open, false, 10),
            Err(ScheduleError::Full)
        );
    }
}
