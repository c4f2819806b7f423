//! Local button task
//!
//! Samples one debounced button and queues its configured command on the
//! cover it is bound to.

use defmt::*;
use embassy_time::{Duration, Ticker};

use parasol_core::state::SymbolicCommand;
use parasol_drivers::DebouncedButton;

use crate::board::BoardInput;
use crate::channels::COVER_COMMANDS;

/// Button sample period in milliseconds
pub const BUTTON_POLL_MS: u32 = 10;

#[embassy_executor::task(pool_size = parasol_core::config::MAX_BUTTONS)]
pub async fn button_task(
    mut button: DebouncedButton<BoardInput>,
    cover: usize,
    command: SymbolicCommand,
) {
    let Some(commands) = COVER_COMMANDS.get(cover) else {
        error!("Button bound to cover slot {} which does not exist", cover);
        return;
    };
    info!("Button task started for cover {} ({})", cover, command.as_str());

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(BUTTON_POLL_MS)));
    loop {
        ticker.next().await;

        if button.update(BUTTON_POLL_MS) {
            debug!("Button press: {} cover {}", command.as_str(), cover);
            commands.send(command).await;
        }
    }
}
