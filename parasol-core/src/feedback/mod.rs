//! Snapshot fan-out
//!
//! Subscribers are notified in subscription order. A subscriber that fails
//! is logged and skipped; the rest still see the snapshot.

use heapless::Vec;

use crate::state::Snapshot;

/// Maximum subscribers per cover
pub const MAX_SUBSCRIBERS: usize = 4;

/// Feedback errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedbackError {
    /// Subscriber list is at capacity
    Full,
    /// Subscriber could not accept the snapshot (e.g. its queue is full)
    Rejected,
    /// Subscriber is gone
    Disconnected,
}

/// Receiver of cover snapshots
///
/// `notify` takes `&self`; subscribers that keep state use interior
/// mutability (a channel sender, a `Cell`).
pub trait SnapshotSubscriber {
    fn notify(&self, snapshot: &Snapshot) -> Result<(), FeedbackError>;
}

/// Delivery counts of one publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PublishReport {
    pub delivered: u8,
    pub failed: u8,
}

/// Ordered subscriber list
pub struct Feedback<'a, const N: usize = MAX_SUBSCRIBERS> {
    subscribers: Vec<&'a dyn SnapshotSubscriber, N>,
}

impl<'a, const N: usize> Default for Feedback<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const N: usize> Feedback<'a, N> {
    pub const fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Append a subscriber
    pub fn subscribe(&mut self, subscriber: &'a dyn SnapshotSubscriber) -> Result<(), FeedbackError> {
        self.subscribers
            .push(subscriber)
            .map_err(|_| FeedbackError::Full)
    }

    /// Number of subscribers
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver a snapshot to every subscriber
    pub fn publish(&self, snapshot: &Snapshot) -> PublishReport {
        let mut report = PublishReport::default();

        for (index, subscriber) in self.subscribers.iter().enumerate() {
            match subscriber.notify(snapshot) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(err) => {
                    log_warn!("Subscriber {} failed: {:?}", index, err);
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }

        report
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use core::cell::{Cell, RefCell};

    use heapless::Vec;

    use super::*;
    use crate::state::PositionStatus;

    /// Subscriber that keeps every snapshot it sees
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub seen: RefCell<Vec<Snapshot, 256>>,
    }

    impl Recorder {
        pub(crate) fn count(&self) -> usize {
            self.seen.borrow().len()
        }

        pub(crate) fn last(&self) -> Option<Snapshot> {
            self.seen.borrow().last().copied()
        }
    }

    impl SnapshotSubscriber for Recorder {
        fn notify(&self, snapshot: &Snapshot) -> Result<(), FeedbackError> {
            self.seen
                .borrow_mut()
                .push(*snapshot)
                .map_err(|_| FeedbackError::Rejected)
        }
    }

    /// Subscriber that always fails
    #[derive(Default)]
    pub(crate) struct Broken {
        pub calls: Cell<u32>,
    }

    impl SnapshotSubscriber for Broken {
        fn notify(&self, _snapshot: &Snapshot) -> Result<(), FeedbackError> {
            self.calls.set(self.calls.get() + 1);
            Err(FeedbackError::Disconnected)
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            status: PositionStatus::Opening,
            current_percent: 12,
            pending_percent: 100,
            remaining_ms: 8_800,
        }
    }

    #[test]
    fn test_failing_subscriber_is_isolated() {
        let first = Recorder::default();
        let broken = Broken::default();
        let last = Recorder::default();

        let mut feedback: Feedback<'_> = Feedback::new();
        feedback.subscribe(&first).unwrap();
        feedback.subscribe(&broken).unwrap();
        feedback.subscribe(&last).unwrap();

        let report = feedback.publish(&snapshot());
        assert_eq!(
            report,
            PublishReport {
                delivered: 2,
                failed: 1
            }
        );
        assert_eq!(first.last(), Some(snapshot()));
        assert_eq!(last.last(), Some(snapshot()));
        assert_eq!(broken.calls.get(), 1);
    }

    #[test]
    fn test_subscribe_capacity() {
        let recorder = Recorder::default();
        let mut feedback: Feedback<'_, 2> = Feedback::new();

        feedback.subscribe(&recorder).unwrap();
        feedback.subscribe(&recorder).unwrap();
        assert_eq!(feedback.subscribe(&recorder), Err(FeedbackError::Full));
        assert_eq!(feedback.len(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feedback: Feedback<'_> = Feedback::new();
        assert!(feedback.is_empty());
        assert_eq!(feedback.publish(&snapshot()), PublishReport::default());
    }
}
