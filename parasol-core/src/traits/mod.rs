//! Hardware abstraction and capability traits
//!
//! The output traits define the interface between the cover logic and
//! relay hardware. The capability traits are the surface a host (a UI, a
//! protocol bridge, a button task) uses to read and command a cover.

pub mod capability;
pub mod output;

pub use capability::{OpenCloseStop, OpenClosedFeedback, PositionReporting, RaiseLowerFeedback};
pub use output::{OutputResolver, ResolveError, SwitchedOutput};
