//! Inter-task communication channels
//!
//! One command queue and one snapshot signal per cover slot, indexed by
//! the cover's position in the configuration.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use parasol_core::config::MAX_COVERS;
use parasol_core::state::{Snapshot, SymbolicCommand};

/// Commands queued per cover before senders wait
const COMMAND_QUEUE_SIZE: usize = 4;

pub type CommandChannel = Channel<CriticalSectionRawMutex, SymbolicCommand, COMMAND_QUEUE_SIZE>;

/// Commands for each cover, sent by the local buttons
pub static COVER_COMMANDS: [CommandChannel; MAX_COVERS] = [const { Channel::new() }; MAX_COVERS];

/// Latest snapshot published by each cover
pub static COVER_SNAPSHOTS: [Signal<CriticalSectionRawMutex, Snapshot>; MAX_COVERS] =
    [const { Signal::new() }; MAX_COVERS];
