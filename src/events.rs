//! Store change notification
//!
//! A broadcast channel of [`StoreEvent`]s. Events are published after the
//! new state is visible to readers, so a subscriber that queries on receipt
//! sees the change. Publishing never blocks and never fails the writer.

use crate::ledger::Level;
use tokio::sync::broadcast;

/// Default channel depth
pub const DEFAULT_CAPACITY: usize = 1024;

/// A change to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    QuoteUpdated { symbol: String },
    PrintAppended { symbol: String, level: Level },
    BookUpdated { symbol: String },
    CandleUpserted { symbol: String, sequence: i64 },
    /// One inbound message finished dispatching
    BatchApplied { applied: usize, skipped: usize },
}

/// Fan-out of store events to any number of subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to current subscribers. Without subscribers the event is dropped.
    pub fn publish(&self, event: StoreEvent) {
        // Err only means nobody is listening
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish(StoreEvent::BatchApplied { applied: 1, skipped: 0 });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_events_delivered_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(StoreEvent::QuoteUpdated { symbol: "SPY".to_string() });
        bus.publish(StoreEvent::PrintAppended {
            symbol: "SPY".to_string(),
            level: Level::AtBid,
        });

        assert_eq!(rx.recv().await.unwrap(), StoreEvent::QuoteUpdated { symbol: "SPY".to_string() });
        assert!(matches!(rx.recv().await.unwrap(), StoreEvent::PrintAppended { level: Level::AtBid, .. }));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_lagging_subscriber_does_not_block_publisher() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for sequence in 0..5 {
            bus.publish(StoreEvent::CandleUpserted {
                symbol: "SPY".to_string(),
                sequence,
            });
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::CandleUpserted { symbol: "SPY".to_string(), sequence: 3 }
        );
    }
}
