//! Parasol - Relay-driven Cover Controller Firmware
//!
//! Main firmware binary for RP2040-based relay boards. Each configured
//! cover runs in its own task, estimating position from elapsed time and
//! pulsing its open/close relays.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use parasol_core::config::{parse_config, SystemConfig};
use parasol_core::Cover;
use parasol_drivers::{DebouncedButton, RelayBank};

use crate::board::{Board, BoardCover};

mod board;
mod channels;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit covers.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../covers.toml");

// Configuration must live forever for task references
static SYSTEM_CONFIG: StaticCell<SystemConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Parasol firmware starting...");

    let p = embassy_rp::init(Default::default());
    let mut board = Board::new(p);
    info!("Peripherals initialized");

    let config: &'static SystemConfig = SYSTEM_CONFIG.init(load_config());

    // Relay pins go into the bank; covers claim them by device and port
    let mut bank = RelayBank::new(&config.relay_devices);
    for gpio in RelayBank::<board::BoardPin>::required_pins(&config.relay_devices) {
        let Some(pin) = board.take_output(gpio) else {
            continue;
        };
        if bank.add_pin(gpio, pin).is_err() {
            warn!("GPIO{} listed twice in relay devices", gpio);
        }
    }

    for (slot, cover_config) in config.covers.iter().enumerate() {
        let cover = match Cover::new(cover_config, &mut bank) {
            Ok(cover) => cover,
            Err(e) => {
                error!("Cover {} rejected: {}", cover_config.name.as_str(), e);
                continue;
            }
        };
        start_cover(&spawner, slot, cover);
    }

    for button in config.buttons.iter() {
        let Some(slot) = config.cover_index(button.cover.as_str()) else {
            warn!("Button {} has no cover", button.name.as_str());
            continue;
        };
        let Some(input) = board.take_input(&button.pin) else {
            continue;
        };
        let button_driver = DebouncedButton::new(input, button.pin.inverted);
        match tasks::button_task(button_driver, slot, button.command) {
            Ok(token) => spawner.spawn(token),
            Err(_) => error!("No task slot for button {}", button.name.as_str()),
        }
    }

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Subscribe the cover's snapshot relay and spawn its tasks
fn start_cover(spawner: &Spawner, slot: usize, mut cover: BoardCover) {
    let Some(relay) = tasks::SNAPSHOT_RELAYS.get(slot) else {
        error!("Cover slot {} out of range", slot);
        return;
    };
    if cover.subscribe(relay).is_err() {
        warn!("{}: snapshot relay not subscribed", cover.name());
    }

    let health = cover.relay_health();
    if !health.is_complete() {
        warn!(
            "{}: relays incomplete (open={}, close={})",
            cover.name(),
            health.open,
            health.close
        );
    }

    let name = heapless::String::try_from(cover.name()).unwrap_or_default();
    match tasks::report_task(slot, name) {
        Ok(token) => spawner.spawn(token),
        Err(_) => error!("No task slot for cover report {}", slot),
    }
    match tasks::cover_task(slot, cover) {
        Ok(token) => spawner.spawn(token),
        Err(_) => error!("No task slot for cover {}", slot),
    }
}

/// Parse the embedded configuration
///
/// A broken config leaves the controller with no covers rather than
/// driving relays from a guess.
fn load_config() -> SystemConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Configuration loaded: {} covers, {} buttons",
                config.covers.len(),
                config.buttons.len()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            SystemConfig::new()
        }
    }
}
