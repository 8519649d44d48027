//! Top-level wiring: one [`SaveContext`] is constructed at process start
//! and handed to every consumer that needs persistence or sync. There is
//! no global state; test code builds as many isolated contexts as it
//! wants.

use crate::core::types::{AUTOSAVE_INTERVAL, MAX_FAILED_SAVE_STREAK, MIN_SYNC_INTERVAL};
use crate::core::Result;
use crate::events::{EventBus, SaveEvent};
use crate::model::SaveRecord;
use crate::resolve::Strategy;
use crate::store::{SavePaths, SaveStore};
use crate::sync::SyncCoordinator;
use crate::sync::gateway::RemoteSaveGateway;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Tunables for one save context. `Default` gives production values;
/// tests shrink the intervals and redirect `data_dir`.
#[derive(Debug, Clone)]
pub struct SaveConfig {
    pub data_dir: PathBuf,
    pub primary_file: String,
    pub backup_file: String,
    pub autosave_interval: Duration,
    pub min_sync_interval: Duration,
    pub strategy: Strategy,
    pub max_failed_save_streak: u32,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("towervault_data"),
            primary_file: "save.json".to_string(),
            backup_file: "save.backup.json".to_string(),
            autosave_interval: AUTOSAVE_INTERVAL,
            min_sync_interval: MIN_SYNC_INTERVAL,
            strategy: Strategy::default(),
            max_failed_save_streak: MAX_FAILED_SAVE_STREAK,
        }
    }
}

impl SaveConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn min_sync_interval(mut self, interval: Duration) -> Self {
        self.min_sync_interval = interval;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn max_failed_save_streak(mut self, streak: u32) -> Self {
        self.max_failed_save_streak = streak;
        self
    }

    fn paths(&self) -> SavePaths {
        SavePaths::new(&self.data_dir, &self.primary_file, &self.backup_file)
    }
}

pub struct SaveContext {
    store: Arc<SaveStore>,
    coordinator: Arc<SyncCoordinator>,
    events: EventBus,
    autosave_interval: Duration,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SaveContext {
    pub fn new(config: SaveConfig, gateway: Arc<dyn RemoteSaveGateway>) -> Self {
        let events = EventBus::new();
        let store = Arc::new(SaveStore::new(
            config.paths(),
            events.clone(),
            config.max_failed_save_streak,
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            store.clone(),
            gateway,
            config.strategy,
            config.min_sync_interval,
            events.clone(),
        ));
        Self {
            store,
            coordinator,
            events,
            autosave_interval: config.autosave_interval,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<SaveStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveEvent> {
        self.events.subscribe()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Loads the durable copy into memory; call once at process start.
    pub async fn load(&self) -> SaveRecord {
        self.store.load().await
    }

    /// Spawns the autosave and auto-sync timer loops.
    pub async fn start_background_tasks(&self) {
        let mut tasks = self.tasks.lock().await;

        let store = self.store.clone();
        let autosave_interval = self.autosave_interval;
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(autosave_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                autosave(&store).await;
            }
        }));

        // Sync eligibility is checked at the autosave cadence; actual
        // syncs are gated by the coordinator's own minimum interval.
        let coordinator = self.coordinator.clone();
        let tick_interval = self.autosave_interval;
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                coordinator.auto_sync_tick().await;
            }
        }));
    }

    /// One autosave attempt: saves iff dirty; concurrency rejections and
    /// I/O failures defer to the next tick (the store logs and counts
    /// them).
    pub async fn autosave_tick(&self) {
        autosave(&self.store).await;
    }

    /// App moved to the background: persist immediately, rotating the
    /// backup first.
    pub async fn on_app_background(&self) {
        if let Err(e) = self.store.save(true).await {
            if !e.is_concurrency_rejection() {
                log::warn!("Background save failed: {}", e);
            }
        }
    }

    /// Process teardown: stop the timers and make a final backed-up save.
    pub async fn shutdown(&self) {
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.on_app_background().await;
    }

    /// User-initiated reset: removes the durable copy and its backup.
    pub async fn reset(&self) -> Result<()> {
        self.store.delete().await
    }

    // ------------------------------------------------------------------
    // Record access passthroughs
    // ------------------------------------------------------------------

    pub async fn record(&self) -> SaveRecord {
        self.store.record().await
    }

    pub async fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaveRecord) -> R,
    {
        self.store.mutate(f).await
    }
}

async fn autosave(store: &SaveStore) {
    if !store.is_dirty() {
        return;
    }
    // Failures keep the dirty flag set; the next tick retries.
    let _ = store.save(false).await;
}
