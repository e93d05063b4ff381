//! Named broadcast signals
//!
//! Components that care about a cross-cutting value (the header tint of the
//! screen behind the sheet, a tab having settled) subscribe to a `Signal`
//! instead of reaching into each other's setters.

use tokio::sync::broadcast;

/// Capacity of each signal's ring buffer; slow subscribers skip ahead
const SIGNAL_CAPACITY: usize = 16;

/// A cloneable, typed event bus for one kind of event
#[derive(Debug, Clone)]
pub struct Signal<T: Clone> {
    name: &'static str,
    tx: broadcast::Sender<T>,
}

impl<T: Clone> Signal<T> {
    /// Create a signal; `name` only shows up in logs
    pub fn new(name: &'static str) -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { name, tx }
    }

    /// Signal name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Publish `value` to every current subscriber
    ///
    /// Returns the number of subscribers reached. Publishing with nobody
    /// listening is fine.
    pub fn publish(&self, value: T) -> usize {
        match self.tx.send(value) {
            Ok(n) => n,
            Err(_) => {
                tracing::trace!(signal = self.name, "published with no subscribers");
                0
            }
        }
    }

    /// Subscribe to future values
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
