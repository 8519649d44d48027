use crate::core::types::{STAMINA_MAX_DEFAULT, stamina_regen_interval, tower_cooldown};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Single stamina pool, regenerating one unit per regen interval of real
/// time. `current` is always within `[0, max]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaState {
    pub current: u32,
    pub max: u32,
    pub last_regen_time: DateTime<Utc>,
}

impl StaminaState {
    pub fn full(now: DateTime<Utc>) -> Self {
        Self {
            current: STAMINA_MAX_DEFAULT,
            max: STAMINA_MAX_DEFAULT,
            last_regen_time: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Lazily applies regeneration owed since `last_regen_time`.
    ///
    /// The regen clock only advances by whole intervals actually credited,
    /// so partial progress toward the next unit is never lost. A full pool
    /// re-anchors the clock to `now`.
    pub fn regenerate(&mut self, now: DateTime<Utc>) {
        if self.is_full() {
            self.last_regen_time = now;
            return;
        }
        let elapsed = now.signed_duration_since(self.last_regen_time);
        if elapsed < stamina_regen_interval() {
            return;
        }
        let interval_secs = stamina_regen_interval().num_seconds();
        let earned = (elapsed.num_seconds() / interval_secs) as u32;
        let credited = earned.min(self.max - self.current);
        self.current += credited;
        if self.is_full() {
            self.last_regen_time = now;
        } else {
            self.last_regen_time += Duration::seconds(interval_secs * i64::from(credited));
        }
    }

    /// Spends `amount` units if available; starts the regen clock when the
    /// pool leaves the full state.
    pub fn spend(&mut self, amount: u32, now: DateTime<Utc>) -> bool {
        if amount > self.current {
            return false;
        }
        if self.is_full() {
            self.last_regen_time = now;
        }
        self.current -= amount;
        true
    }

    pub fn refill(&mut self, now: DateTime<Utc>) {
        self.current = self.max;
        self.last_regen_time = now;
    }

    pub fn clamp(&mut self) {
        if self.current > self.max {
            self.current = self.max;
        }
    }
}

/// Replay gate for one `(tower_id, owner_id)` pair. At most one entry
/// exists per pair within a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownState {
    pub tower_id: u32,
    pub owner_id: String,
    pub last_played: DateTime<Utc>,
}

impl CooldownState {
    pub fn new(tower_id: u32, owner_id: impl Into<String>, last_played: DateTime<Utc>) -> Self {
        Self {
            tower_id,
            owner_id: owner_id.into(),
            last_played,
        }
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let expires = self.last_played + tower_cooldown();
        (expires - now).max(Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == Duration::zero()
    }

    /// Combine two entries for the same pair: the more recent play wins,
    /// keeping the stricter cooldown.
    pub fn combined(&self, other: &CooldownState) -> CooldownState {
        if other.last_played > self.last_played {
            other.clone()
        } else {
            self.clone()
        }
    }
}
