//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod button;
pub mod cover;

pub use button::{button_task, BUTTON_POLL_MS};
pub use cover::{cover_task, report_task, SNAPSHOT_RELAYS};
