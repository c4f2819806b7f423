//! Position status

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What the cover is doing, as far as the estimator knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PositionStatus {
    /// Nothing commanded since power-up
    #[default]
    Unknown,
    /// At the fully closed end
    Closed,
    /// At the fully open end
    Open,
    /// Moving toward open
    Opening,
    /// Moving toward closed
    Closing,
    /// Halted between the ends
    Stopped,
    /// Fault reported by the host
    Error,
}

impl PositionStatus {
    /// Display name
    pub const fn as_str(&self) -> &'static str {
        match self {
            PositionStatus::Unknown => "Unknown",
            PositionStatus::Closed => "Closed",
            PositionStatus::Open => "Open",
            PositionStatus::Opening => "Opening",
            PositionStatus::Closing => "Closing",
            PositionStatus::Stopped => "Stopped",
            PositionStatus::Error => "Error",
        }
    }

    /// Whether the cover is being driven
    pub const fn is_moving(&self) -> bool {
        matches!(self, PositionStatus::Opening | PositionStatus::Closing)
    }

    /// Whether this status ends a run
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            PositionStatus::Closed | PositionStatus::Open | PositionStatus::Stopped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(PositionStatus::Opening.is_moving());
        assert!(!PositionStatus::Opening.is_terminal());
        assert!(PositionStatus::Stopped.is_terminal());
        assert!(!PositionStatus::Unknown.is_terminal());
        assert!(!PositionStatus::Error.is_moving());
        assert_eq!(PositionStatus::default().as_str(), "Unknown");
    }
}
