//! Event records and the bounded queues they are delivered on.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tablet_proto::{RealtimeStats, TabletType};

/// One `set_serving_type` call, recorded whether or not it took effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// Requested query-service state
    pub serving: bool,
    /// Requested tablet type
    pub tablet_type: TabletType,
}

/// One `broadcast_health` call
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BroadcastData {
    /// Primary term start time of the broadcast. Always 0 from the mock.
    pub ter_timestamp: i64,
    /// Realtime stats of the broadcast. Always zero from the mock.
    pub realtime_stats: RealtimeStats,
    /// Query service enabled and not in lameduck
    pub serving: bool,
}

/// Bounded FIFO of events.
///
/// `push` blocks while the queue is full, so a test that never drains a
/// queue stalls the controller after `capacity` events.
pub struct EventQueue<T> {
    name: &'static str,
    capacity: usize,
    tx: SyncSender<T>,
    rx: Mutex<Receiver<T>>,
}

impl<T> EventQueue<T> {
    /// Create a queue holding at most `capacity` undelivered events.
    ///
    /// A capacity of 0 is raised to 1: a zero-capacity sync channel is a
    /// rendezvous and would block a single-threaded test on its first push.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::sync_channel(capacity);
        Self {
            name,
            capacity,
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event, blocking while the queue is full
    pub fn push(&self, event: T) {
        // the receiver lives as long as `self`, so send cannot disconnect
        let _ = self.tx.send(event);
    }

    /// Take the oldest event without waiting
    pub fn try_next(&self) -> Option<T> {
        match self.receiver().try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take the oldest event, waiting up to `timeout` for one to arrive
    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver().recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Take every queued event, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.receiver().try_iter().collect()
    }

    fn receiver(&self) -> std::sync::MutexGuard<'_, Receiver<T>> {
        self.rx.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish()
    }
}
