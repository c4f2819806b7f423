//! Cover task
//!
//! Owns one [`BoardCover`]. Waits for either a command or the cover's next
//! deadline, then feeds elapsed time through `update_with_delta` before
//! applying the command, so relay pulses and estimator ticks run on time.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use parasol_core::config::MAX_COVERS;
use parasol_core::feedback::{FeedbackError, SnapshotSubscriber};
use parasol_core::state::{FeedbackValues, Snapshot};

use crate::board::BoardCover;
use crate::channels::{COVER_COMMANDS, COVER_SNAPSHOTS};

/// Wake-up period while nothing is scheduled
const IDLE_WAIT_MS: u32 = 1000;

/// Subscriber forwarding snapshots to a cover's signal
#[derive(Clone, Copy)]
pub struct SnapshotRelay {
    slot: usize,
}

/// One relay per cover slot
pub static SNAPSHOT_RELAYS: [SnapshotRelay; MAX_COVERS] = snapshot_relays();

const fn snapshot_relays() -> [SnapshotRelay; MAX_COVERS] {
    let mut relays = [SnapshotRelay { slot: 0 }; MAX_COVERS];
    let mut slot = 0;
    while slot < MAX_COVERS {
        relays[slot].slot = slot;
        slot += 1;
    }
    relays
}

impl SnapshotSubscriber for SnapshotRelay {
    fn notify(&self, snapshot: &Snapshot) -> Result<(), FeedbackError> {
        let signal = COVER_SNAPSHOTS
            .get(self.slot)
            .ok_or(FeedbackError::Disconnected)?;
        signal.signal(*snapshot);
        Ok(())
    }
}

#[embassy_executor::task(pool_size = MAX_COVERS)]
pub async fn cover_task(slot: usize, mut cover: BoardCover) {
    let Some(commands) = COVER_COMMANDS.get(slot) else {
        error!("Cover slot {} out of range", slot);
        return;
    };
    info!("Cover task started: {}", cover.name());

    let mut last = Instant::now();
    loop {
        let wait_ms = cover.next_deadline().unwrap_or(IDLE_WAIT_MS).max(1);
        let command = match select(commands.receive(), Timer::after_millis(u64::from(wait_ms))).await
        {
            Either::First(command) => Some(command),
            Either::Second(()) => None,
        };

        let now = Instant::now();
        let delta_ms = u32::try_from((now - last).as_millis()).unwrap_or(u32::MAX);
        last = now;
        cover.update_with_delta(delta_ms);

        let Some(command) = command else {
            continue;
        };
        debug!("{}: {}", cover.name(), command.as_str());
        if let Some(report) = cover.request_symbolic(command) {
            if report.failed > 0 {
                warn!("{}: {} subscribers failed", cover.name(), report.failed);
            }
        }
    }
}

/// Logs each snapshot a cover publishes
#[embassy_executor::task(pool_size = MAX_COVERS)]
pub async fn report_task(slot: usize, name: heapless::String<16>) {
    let Some(signal) = COVER_SNAPSHOTS.get(slot) else {
        return;
    };

    loop {
        let snapshot = signal.wait().await;
        let values = FeedbackValues::from(&snapshot);
        info!(
            "{}: {} {}% ({} ms left)",
            name.as_str(),
            values.status,
            values.percent_open,
            values.remaining_ms
        );
    }
}
