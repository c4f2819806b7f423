//! Snapshots and derived feedback values

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::status::PositionStatus;

/// Point-in-time copy of a cover's estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub status: PositionStatus,
    /// Estimated percent open
    pub current_percent: u8,
    /// Target of the run in flight
    pub pending_percent: u8,
    /// Estimated time to reach the target (ms)
    pub remaining_ms: u32,
}

/// Host-facing feedback fields derived from a [`Snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FeedbackValues {
    pub is_open: bool,
    pub is_closed: bool,
    /// Moving toward open
    pub is_lowering: bool,
    /// Moving toward closed
    pub is_raising: bool,
    pub is_stopped: bool,
    pub percent_open: u8,
    pub remaining_ms: u32,
    pub status: &'static str,
}

impl From<&Snapshot> for FeedbackValues {
    fn from(snapshot: &Snapshot) -> Self {
        let status = snapshot.status;
        Self {
            is_open: status == PositionStatus::Open,
            is_closed: status == PositionStatus::Closed,
            is_lowering: status == PositionStatus::Opening,
            is_raising: status == PositionStatus::Closing,
            is_stopped: !status.is_moving(),
            percent_open: snapshot.current_percent,
            remaining_ms: snapshot.remaining_ms,
            status: status.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_pairs_lowering_with_opening() {
        let snapshot = Snapshot {
            status: PositionStatus::Opening,
            current_percent: 40,
            pending_percent: 100,
            remaining_ms: 6000,
        };

        let values = FeedbackValues::from(&snapshot);
        assert!(values.is_lowering);
        assert!(!values.is_raising);
        assert!(!values.is_stopped);
        assert_eq!(values.percent_open, 40);
        assert_eq!(values.status, "Opening");
    }

    #[test]
    fn test_feedback_at_endpoint() {
        let snapshot = Snapshot {
            status: PositionStatus::Closed,
            ..Default::default()
        };

        let values = FeedbackValues::from(&snapshot);
        assert!(values.is_closed);
        assert!(!values.is_open);
        assert!(values.is_stopped);
        assert_eq!(values.remaining_ms, 0);
    }
}
