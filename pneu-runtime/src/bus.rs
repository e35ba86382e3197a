//! Snapshot fan-out.
//!
//! Each subscriber gets its own bounded queue. A slow subscriber loses its
//! oldest snapshots rather than stalling the simulation loop or growing
//! without bound; the freshest state always gets through.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use pneu_types::SimulationSnapshot;

/// Fan-out of simulation snapshots to any number of subscribers.
#[derive(Debug)]
pub struct SnapshotBus {
    subscribers: Vec<(Sender<SimulationSnapshot>, Receiver<SimulationSnapshot>)>,
    capacity: usize,
    dropped: u64,
}

impl SnapshotBus {
    /// Create a bus whose per-subscriber queues hold `capacity` snapshots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<SimulationSnapshot> {
        let (tx, rx) = bounded(self.capacity);
        self.subscribers.push((tx, rx.clone()));
        rx
    }

    /// Number of subscribers still connected.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Snapshots dropped so far because a subscriber queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Publish one snapshot to every subscriber.
    ///
    /// A full queue drops its oldest entry to make room; a departed
    /// subscriber is pruned. Returns the number of deliveries.
    pub fn publish(&mut self, snapshot: &SimulationSnapshot) -> usize {
        let mut delivered = 0;
        let mut dropped = 0;
        self.subscribers.retain(|(tx, rx)| {
            // The bus keeps a receiver clone of its own to pop the oldest
            // entry, so the channel never disconnects on its own; the
            // subscriber is gone once only that clone remains.
            if tx.receiver_count() <= 1 {
                return false;
            }
            match tx.try_send(snapshot.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(rejected)) => {
                    // Make room by discarding the oldest queued snapshot.
                    let _ = rx.try_recv();
                    dropped += 1;
                    if tx.try_send(rejected).is_ok() {
                        delivered += 1;
                    }
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });
        self.dropped += dropped;
        delivered
    }
}
