//! Orchestrates pull → resolve → persist → push against the remote
//! gateway, one sync in flight at a time.
//!
//! Within one sync the merged record is always persisted locally before it
//! is pushed, so a crash between the two steps never leaves the remote
//! ahead of a local copy that would lose the merge.

pub mod gateway;

use crate::core::types::now_utc;
use crate::core::{Result, SaveError};
use crate::events::{EventBus, SaveEvent};
use crate::resolve::{Strategy, resolve};
use crate::store::SaveStore;
use self::gateway::RemoteSaveGateway;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub struct SyncCoordinator {
    store: Arc<SaveStore>,
    gateway: Arc<dyn RemoteSaveGateway>,
    strategy: Strategy,
    min_sync_interval: Duration,
    // Idle/Syncing state machine: holding this lock IS the Syncing state.
    // try_lock makes overlapping triggers fail fast instead of queueing.
    in_flight: Mutex<()>,
    last_completed: Mutex<Option<Instant>>,
    connected: AtomicBool,
    events: EventBus,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<SaveStore>,
        gateway: Arc<dyn RemoteSaveGateway>,
        strategy: Strategy,
        min_sync_interval: Duration,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            gateway,
            strategy,
            min_sync_interval,
            in_flight: Mutex::new(()),
            last_completed: Mutex::new(None),
            connected: AtomicBool::new(false),
            events,
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Full sync: pull remote, resolve, persist locally, push the merged
    /// record back.
    pub async fn sync_to_remote(&self) -> Result<()> {
        self.sync_internal(true).await
    }

    /// Pull-only sync for new-device restore: pull remote, resolve,
    /// persist locally. Nothing is pushed.
    pub async fn sync_from_remote(&self) -> Result<()> {
        self.sync_internal(false).await
    }

    async fn sync_internal(&self, push: bool) -> Result<()> {
        if !self.gateway.is_available() {
            self.events
                .emit(SaveEvent::SyncError(SaveError::RemoteUnavailable.to_string()));
            return Err(SaveError::RemoteUnavailable);
        }
        let Ok(_guard) = self.in_flight.try_lock() else {
            return Err(SaveError::SyncInProgress);
        };

        self.events.emit(SaveEvent::SyncStarted);
        let result = self.run_sync(push).await;
        *self.last_completed.lock().await = Some(Instant::now());
        match &result {
            Ok(()) => {
                tracing::info!(pushed = push, "Sync completed");
                self.events.emit(SaveEvent::SyncCompleted { success: true });
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sync failed");
                self.events.emit(SaveEvent::SyncError(e.to_string()));
                self.events.emit(SaveEvent::SyncCompleted { success: false });
            }
        }
        result
    }

    async fn run_sync(&self, push: bool) -> Result<()> {
        let local = self.store.record().await;
        let remote = self.gateway.fetch().await?;
        let merged = resolve(&local, remote.as_ref(), self.strategy, now_utc());

        // Persist the merge locally first; if the push fails the local
        // copy already reflects the merge and the next cycle catches the
        // remote up.
        self.store.set_record(merged).await;
        self.store.save(true).await?;

        if push {
            let persisted = self.store.record().await;
            self.gateway.push(&persisted).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Triggers
    // ------------------------------------------------------------------

    /// Edge-triggered connectivity signal. An offline→online transition
    /// kicks an immediate sync attempt; the coordinator never probes the
    /// network itself.
    pub async fn on_connectivity_changed(&self, connected: bool) {
        let was_connected = self.connected.swap(connected, Ordering::SeqCst);
        if connected && !was_connected {
            tracing::info!("Connectivity restored, attempting sync");
            self.try_sync_quietly().await;
        }
    }

    /// Periodic trigger: no-op unless connected, idle, and at least the
    /// minimum interval past the last completion.
    pub async fn auto_sync_tick(&self) {
        if !self.is_connected() || self.is_syncing() {
            return;
        }
        if let Some(completed) = *self.last_completed.lock().await {
            if completed.elapsed() < self.min_sync_interval {
                return;
            }
        }
        self.try_sync_quietly().await;
    }

    async fn try_sync_quietly(&self) {
        if let Err(e) = self.sync_to_remote().await {
            if !e.is_concurrency_rejection() {
                tracing::debug!(error = %e, "Background sync attempt failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SavePaths;
    use crate::sync::gateway::MemoryGateway;
    use tempfile::TempDir;

    fn coordinator_in(dir: &TempDir) -> (SyncCoordinator, Arc<MemoryGateway>) {
        let events = EventBus::new();
        let paths = SavePaths::new(dir.path(), "save.json", "save.backup.json");
        let store = Arc::new(SaveStore::new(paths, events.clone(), 3));
        let gateway = Arc::new(MemoryGateway::new());
        let coordinator = SyncCoordinator::new(
            store,
            gateway.clone(),
            Strategy::UseNewer,
            Duration::from_secs(300),
            events,
        );
        (coordinator, gateway)
    }

    #[test]
    fn test_sync_rejected_while_in_flight() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let (coordinator, _gateway) = coordinator_in(&dir);
            coordinator.store.load().await;

            let guard = coordinator.in_flight.try_lock().unwrap();
            assert!(coordinator.is_syncing());
            let err = coordinator.sync_to_remote().await.unwrap_err();
            assert!(matches!(err, SaveError::SyncInProgress));

            drop(guard);
            assert!(!coordinator.is_syncing());
            coordinator.sync_to_remote().await.unwrap();
        });
    }

    #[test]
    fn test_unavailable_gateway_fails_fast() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let (coordinator, gateway) = coordinator_in(&dir);
            coordinator.store.load().await;
            gateway.set_available(false);

            let err = coordinator.sync_to_remote().await.unwrap_err();
            assert!(matches!(err, SaveError::RemoteUnavailable));
            assert_eq!(gateway.fetch_count(), 0);
        });
    }

    #[test]
    fn test_connectivity_edge_is_rising_only() {
        tokio_test::block_on(async {
            let dir = TempDir::new().unwrap();
            let (coordinator, gateway) = coordinator_in(&dir);
            coordinator.store.load().await;

            coordinator.on_connectivity_changed(true).await;
            assert_eq!(gateway.fetch_count(), 1);

            // Staying connected is not an edge.
            coordinator.on_connectivity_changed(true).await;
            assert_eq!(gateway.fetch_count(), 1);

            coordinator.on_connectivity_changed(false).await;
            coordinator.on_connectivity_changed(true).await;
            assert_eq!(gateway.fetch_count(), 2);
        });
    }
}
