//! Single source of truth for the durable save copy.
//!
//! The store owns the in-memory [`SaveRecord`] snapshot, the dirty flag,
//! and the primary/backup file pair. Writes are crash-safe (temp file +
//! atomic rename) and at most one save runs at a time; an overlapping
//! caller is rejected immediately and retries on its next tick.

pub mod disk;

use crate::codec::{self, validator};
use crate::core::types::now_utc;
use crate::core::{Result, SaveError};
use crate::events::{EventBus, SaveEvent};
use crate::model::SaveRecord;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;

/// Durable file pair: `primary` is the most recent atomically-replaced
/// write, `backup` the pre-save snapshot of the previous primary.
#[derive(Debug, Clone)]
pub struct SavePaths {
    pub primary: PathBuf,
    pub backup: PathBuf,
}

impl SavePaths {
    pub fn new(data_dir: impl AsRef<Path>, primary_file: &str, backup_file: &str) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            primary: data_dir.join(primary_file),
            backup: data_dir.join(backup_file),
        }
    }
}

pub struct SaveStore {
    paths: SavePaths,
    record: Mutex<SaveRecord>,
    dirty: AtomicBool,
    // Single concurrency guard: held for the whole of one save (or
    // delete). Acquired with try_lock so overlapping ticks fail fast.
    save_guard: Mutex<()>,
    failed_save_streak: AtomicU32,
    max_failed_save_streak: u32,
    events: EventBus,
}

impl SaveStore {
    pub fn new(paths: SavePaths, events: EventBus, max_failed_save_streak: u32) -> Self {
        Self {
            paths,
            record: Mutex::new(SaveRecord::default()),
            dirty: AtomicBool::new(false),
            save_guard: Mutex::new(()),
            failed_save_streak: AtomicU32::new(0),
            max_failed_save_streak,
            events,
        }
    }

    pub fn paths(&self) -> &SavePaths {
        &self.paths
    }

    // ------------------------------------------------------------------
    // Load
    // ------------------------------------------------------------------

    /// Loads the durable copy, degrading through the backup to a fresh
    /// default record. Never fails: the caller always gets a usable
    /// record.
    ///
    /// A record that did not come intact from the primary file is marked
    /// dirty so the next save rewrites it.
    pub async fn load(&self) -> SaveRecord {
        let (record, dirty) = match self.read_durable_copy() {
            LoadOutcome::Primary(record) => (record, false),
            LoadOutcome::Backup(record) => (record, true),
            LoadOutcome::Fresh => {
                info!("No usable save found, starting a fresh record");
                (SaveRecord::default(), true)
            }
        };
        *self.record.lock().await = record.clone();
        self.dirty.store(dirty, Ordering::SeqCst);
        self.events.emit(SaveEvent::SaveLoaded);
        record
    }

    fn read_durable_copy(&self) -> LoadOutcome {
        match disk::read_if_exists(&self.paths.primary) {
            Ok(Some(text)) => match decode_and_validate(&text) {
                Ok(record) => return LoadOutcome::Primary(record),
                Err(e) => warn!("Primary save rejected ({}), trying backup", e),
            },
            Ok(None) => return LoadOutcome::Fresh,
            Err(e) => warn!("Primary save unreadable ({}), trying backup", e),
        }
        match disk::read_if_exists(&self.paths.backup) {
            Ok(Some(text)) => match decode_and_validate(&text) {
                Ok(record) => LoadOutcome::Backup(record),
                Err(e) => {
                    warn!("Backup save rejected ({}), falling back to defaults", e);
                    LoadOutcome::Fresh
                }
            },
            Ok(None) => LoadOutcome::Fresh,
            Err(e) => {
                warn!("Backup save unreadable ({}), falling back to defaults", e);
                LoadOutcome::Fresh
            }
        }
    }

    // ------------------------------------------------------------------
    // Save
    // ------------------------------------------------------------------

    /// Persists the in-memory record. Rejects with
    /// [`SaveError::SaveInProgress`] when another save is in flight. The
    /// dirty flag is cleared only on success; on failure the record stays
    /// dirty and the next tick retries.
    pub async fn save(&self, create_backup: bool) -> Result<()> {
        let Ok(_guard) = self.save_guard.try_lock() else {
            return Err(SaveError::SaveInProgress);
        };

        if create_backup {
            // Best effort: a failed backup rotation never aborts the save.
            if let Err(e) = disk::copy_if_exists(&self.paths.primary, &self.paths.backup) {
                warn!("Backup rotation failed: {}", e);
            }
        }

        let result = self.write_primary().await;
        match result {
            Ok(()) => {
                self.dirty.store(false, Ordering::SeqCst);
                self.failed_save_streak.store(0, Ordering::SeqCst);
                self.events.emit(SaveEvent::SaveWritten);
                Ok(())
            }
            Err(e) => {
                let streak = self.failed_save_streak.fetch_add(1, Ordering::SeqCst) + 1;
                warn!("Save failed ({} in a row): {}", streak, e);
                if streak >= self.max_failed_save_streak {
                    self.events
                        .emit(SaveEvent::PersistenceDegraded { failed_saves: streak });
                }
                Err(e)
            }
        }
    }

    async fn write_primary(&self) -> Result<()> {
        let encoded = {
            let mut record = self.record.lock().await;
            record.last_save_time = now_utc();
            codec::encode(&record)?
        };
        disk::atomic_write(&self.paths.primary, &encoded)
    }

    // ------------------------------------------------------------------
    // In-memory record access
    // ------------------------------------------------------------------

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn failed_save_streak(&self) -> u32 {
        self.failed_save_streak.load(Ordering::SeqCst)
    }

    /// Cloned snapshot of the current record. Callers work copy-in /
    /// copy-out; no live reference to the shared record ever escapes.
    pub async fn record(&self) -> SaveRecord {
        self.record.lock().await.clone()
    }

    /// The one mutation doorway for gameplay consumers: applies `f` to the
    /// record and marks it dirty.
    pub async fn mutate<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SaveRecord) -> R,
    {
        let mut record = self.record.lock().await;
        let out = f(&mut record);
        self.dirty.store(true, Ordering::SeqCst);
        out
    }

    /// Replaces the record wholesale (post-merge path) and marks dirty.
    pub async fn set_record(&self, new_record: SaveRecord) {
        *self.record.lock().await = new_record;
        self.dirty.store(true, Ordering::SeqCst);
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// User-initiated reset: removes the primary and the backup and resets
    /// the in-memory state to fresh defaults.
    pub async fn delete(&self) -> Result<()> {
        // Serializes with any in-flight save rather than rejecting; a
        // reset is a deliberate user action, not a timer tick.
        let _guard = self.save_guard.lock().await;
        disk::remove_if_exists(&self.paths.primary)?;
        disk::remove_if_exists(&self.paths.backup)?;
        *self.record.lock().await = SaveRecord::default();
        self.dirty.store(true, Ordering::SeqCst);
        self.events.emit(SaveEvent::SaveDeleted);
        Ok(())
    }
}

enum LoadOutcome {
    Primary(SaveRecord),
    Backup(SaveRecord),
    Fresh,
}

fn decode_and_validate(text: &str) -> Result<SaveRecord> {
    let record = codec::decode(text)?;
    validator::validate(&record)?;
    Ok(record)
}
