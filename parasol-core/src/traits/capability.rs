//! Cover capability traits
//!
//! Each trait is one facet of a cover as seen from the outside. A host that
//! only needs to show a percentage depends on [`PositionReporting`]; a wall
//! button only needs [`OpenCloseStop`].

use crate::state::PositionStatus;

/// Position estimate reporting
pub trait PositionReporting {
    /// Estimated percent open (0 = closed, 100 = open)
    fn percent_open(&self) -> u8;

    /// Estimated time until the target is reached (ms)
    fn remaining_ms(&self) -> u32;

    /// Current status
    fn status(&self) -> PositionStatus;

    /// Current status as a display name
    fn status_name(&self) -> &'static str {
        self.status().as_str()
    }
}

/// Symbolic movement commands
pub trait OpenCloseStop {
    /// Move to fully open
    fn open(&mut self);

    /// Move to fully closed
    fn close(&mut self);

    /// Stop where the cover is now
    fn stop(&mut self);
}

/// Endpoint feedback
pub trait OpenClosedFeedback {
    /// Cover reached fully open
    fn is_open(&self) -> bool;

    /// Cover reached fully closed
    fn is_closed(&self) -> bool;
}

/// Motion feedback in raise/lower terms
///
/// Lowering pairs with [`PositionStatus::Opening`] and raising with
/// [`PositionStatus::Closing`]: a screen pays out (lowers) as it opens.
pub trait RaiseLowerFeedback {
    /// Cover is moving toward closed
    fn is_raising(&self) -> bool;

    /// Cover is moving toward open
    fn is_lowering(&self) -> bool;

    /// Cover is not moving
    fn is_stopped(&self) -> bool {
        !self.is_raising() && !self.is_lowering()
    }
}
