pub mod error;
pub mod types;

pub use error::{Result, SaveError};
pub use types::{
    AUTOSAVE_INTERVAL, MAX_FAILED_SAVE_STREAK, MAX_RECENT_ATTEMPTS, MIN_SYNC_INTERVAL,
    SCHEMA_VERSION, STAMINA_MAX_DEFAULT, STAMINA_REGEN_SECS, TOWER_COOLDOWN_SECS, now_utc,
    stamina_regen_interval, tower_cooldown,
};
