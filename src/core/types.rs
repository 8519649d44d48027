use chrono::{DateTime, Duration, Utc};
use std::time::Duration as StdDuration;

/// Stamped into every record the current writer produces. Decoders accept
/// older versions (migration hook) and reject newer ones.
pub const SCHEMA_VERSION: u32 = 1;

/// Upper bound on the attempt history kept in a save record. Oldest
/// entries are evicted first.
pub const MAX_RECENT_ATTEMPTS: usize = 20;

/// Default stamina pool size for a fresh record.
pub const STAMINA_MAX_DEFAULT: u32 = 5;

/// One stamina unit regenerates per this many seconds of real time.
pub const STAMINA_REGEN_SECS: i64 = 600;

/// A tower can be re-attempted this many seconds after the last play.
pub const TOWER_COOLDOWN_SECS: i64 = 1800;

/// Minimum gap between automatic persistence attempts.
pub const AUTOSAVE_INTERVAL: StdDuration = StdDuration::from_secs(30);

/// Minimum gap between automatic sync attempts while connected.
pub const MIN_SYNC_INTERVAL: StdDuration = StdDuration::from_secs(300);

/// Consecutive failed saves tolerated before consumers are told that
/// dirty data is accumulating unsaved.
pub const MAX_FAILED_SAVE_STREAK: u32 = 3;

pub fn stamina_regen_interval() -> Duration {
    Duration::seconds(STAMINA_REGEN_SECS)
}

pub fn tower_cooldown() -> Duration {
    Duration::seconds(TOWER_COOLDOWN_SECS)
}

/// All timestamps are stored and compared in UTC so device timezone
/// changes cannot reorder saves.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
