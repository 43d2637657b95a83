//! Outbound occurrence delivery.
//!
//! Subscribers receive occurrences through bounded crossbeam channels.
//! Delivery uses `try_send`: a full queue drops the occurrence for that
//! subscriber and a disconnected receiver is forgotten. The tick never
//! blocks on a consumer.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use slither_core::Occurrence;

/// Fan-out of occurrences to subscribers.
#[derive(Debug, Default)]
pub(crate) struct OccurrenceFeed {
    subscribers: Vec<Sender<Occurrence>>,
    dropped_total: u64,
}

impl OccurrenceFeed {
    /// Register a subscriber with a queue of `capacity` occurrences.
    pub(crate) fn subscribe(&mut self, capacity: usize) -> Receiver<Occurrence> {
        let (tx, rx) = bounded(capacity.max(1));
        self.subscribers.push(tx);
        rx
    }

    /// Number of connected subscribers.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Occurrences dropped since construction.
    pub(crate) fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    /// Deliver `occurrences` in order. Returns the number dropped.
    pub(crate) fn publish(&mut self, occurrences: &[Occurrence]) -> u64 {
        if occurrences.is_empty() {
            return 0;
        }
        let mut dropped = 0u64;
        self.subscribers.retain(|tx| {
            for occurrence in occurrences {
                match tx.try_send(occurrence.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => dropped += 1,
                    Err(TrySendError::Disconnected(_)) => return false,
                }
            }
            true
        });
        self.dropped_total += dropped;
        dropped
    }
}
