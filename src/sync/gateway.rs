//! Abstract capability the sync coordinator calls. The real cloud backend
//! lives behind this trait; the crate ships an in-process implementation
//! used as the offline default and as a scriptable test double.

use crate::core::{Result, SaveError};
use crate::model::SaveRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

#[async_trait]
pub trait RemoteSaveGateway: Send + Sync {
    /// Cheap availability probe; the coordinator fails fast when this is
    /// false.
    fn is_available(&self) -> bool;

    /// Fetches the remote record, `None` when the player has never synced.
    async fn fetch(&self) -> Result<Option<SaveRecord>>;

    /// Replaces the remote record.
    async fn push(&self, record: &SaveRecord) -> Result<()>;
}

/// In-process gateway with scriptable availability, failures, and latency.
#[derive(Default)]
pub struct MemoryGateway {
    available: AtomicBool,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
    latency: Mutex<Duration>,
    stored: Mutex<Option<SaveRecord>>,
    fetch_count: AtomicU32,
    push_count: AtomicU32,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Artificial delay applied to fetch and push, for exercising the
    /// one-sync-in-flight guard.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.lock().await = latency;
    }

    pub async fn set_stored(&self, record: Option<SaveRecord>) {
        *self.stored.lock().await = record;
    }

    pub async fn stored(&self) -> Option<SaveRecord> {
        self.stored.lock().await.clone()
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> u32 {
        self.push_count.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteSaveGateway for MemoryGateway {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn fetch(&self) -> Result<Option<SaveRecord>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SaveError::Remote("fetch failed".to_string()));
        }
        Ok(self.stored.lock().await.clone())
    }

    async fn push(&self, record: &SaveRecord) -> Result<()> {
        self.push_count.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(SaveError::Remote("push failed".to_string()));
        }
        *self.stored.lock().await = Some(record.clone());
        Ok(())
    }
}
