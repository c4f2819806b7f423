//! Cover status, commands and snapshots
//!
//! Status values are what the estimator reports; commands are what callers
//! ask for. A [`Snapshot`] is the copy of both that goes out to subscribers.

pub mod command;
pub mod snapshot;
pub mod status;

pub use command::SymbolicCommand;
pub use snapshot::{FeedbackValues, Snapshot};
pub use status::PositionStatus;
