//! Notifications exposed to UI and gameplay consumers.
//!
//! Delivery is fire-and-forget over a broadcast channel: a lagging or
//! absent receiver never blocks the store or the coordinator, and handlers
//! cannot re-enter the emitting operation because delivery happens on the
//! receiver's own task.

use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    SaveLoaded,
    SaveWritten,
    SaveDeleted,
    SyncStarted,
    SyncCompleted { success: bool },
    SyncError(String),
    /// Dirty data has gone unsaved for `failed_saves` consecutive
    /// attempts; consumers should surface a persistent-storage warning.
    PersistenceDegraded { failed_saves: u32 },
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SaveEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: SaveEvent) {
        // Send only fails when no receiver is subscribed, which is fine.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
