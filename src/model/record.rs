use crate::core::types::{MAX_RECENT_ATTEMPTS, SCHEMA_VERSION, now_utc};
use crate::model::progress::{AchievementState, AttemptRecord, TowerState};
use crate::model::user::UserProfile;
use crate::model::vitals::{CooldownState, StaminaState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Root aggregate of one player's persistent state. One record exists per
/// player/device identity; gameplay mutates it in memory and the store
/// persists it.
///
/// Structural invariants (re-established by [`SaveRecord::normalize`],
/// checked by `codec::validator`):
/// - `owner_id` never changes after creation
/// - at most one tower entry per `tower_id`
/// - at most one achievement entry per `achievement_id`
/// - at most one cooldown entry per `(tower_id, owner_id)`
/// - `recent_attempts` holds at most `MAX_RECENT_ATTEMPTS` entries
/// - `stamina.current <= stamina.max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub owner_id: String,
    pub schema_version: u32,
    pub user: UserProfile,
    pub towers: Vec<TowerState>,
    pub achievements: Vec<AchievementState>,
    pub recent_attempts: Vec<AttemptRecord>,
    pub stamina: StaminaState,
    pub cooldowns: Vec<CooldownState>,
    pub last_save_time: DateTime<Utc>,
}

impl Default for SaveRecord {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

impl SaveRecord {
    /// Fresh record for a new player: full stamina, empty history, the
    /// first tower unlocked.
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = now_utc();
        Self {
            owner_id: owner_id.into(),
            schema_version: SCHEMA_VERSION,
            user: UserProfile::default(),
            towers: vec![TowerState::unlocked(1)],
            achievements: Vec::new(),
            recent_attempts: Vec::new(),
            stamina: StaminaState::full(now),
            cooldowns: Vec::new(),
            last_save_time: now,
        }
    }

    // ------------------------------------------------------------------
    // Towers
    // ------------------------------------------------------------------

    pub fn tower(&self, tower_id: u32) -> Option<&TowerState> {
        self.towers.iter().find(|t| t.tower_id == tower_id)
    }

    /// Keyed upsert: returns the existing entry or inserts a locked one.
    pub fn tower_mut(&mut self, tower_id: u32) -> &mut TowerState {
        if let Some(idx) = self.towers.iter().position(|t| t.tower_id == tower_id) {
            return &mut self.towers[idx];
        }
        self.towers.push(TowerState::locked(tower_id));
        self.towers.last_mut().unwrap()
    }

    /// Unlocking is monotonic; repeated unlocks are no-ops.
    pub fn unlock_tower(&mut self, tower_id: u32) {
        self.tower_mut(tower_id).is_unlocked = true;
    }

    pub fn record_floor(&mut self, tower_id: u32, floor: u32) {
        let tower = self.tower_mut(tower_id);
        if floor > tower.highest_floor {
            tower.highest_floor = floor;
        }
    }

    // ------------------------------------------------------------------
    // Achievements
    // ------------------------------------------------------------------

    pub fn achievement(&self, achievement_id: &str) -> Option<&AchievementState> {
        self.achievements
            .iter()
            .find(|a| a.achievement_id == achievement_id)
    }

    /// Idempotent: the first earn date is historically meaningful and is
    /// never overwritten.
    pub fn earn_achievement(&mut self, achievement_id: &str, at: DateTime<Utc>) {
        if let Some(existing) = self
            .achievements
            .iter_mut()
            .find(|a| a.achievement_id == achievement_id)
        {
            if !existing.is_earned {
                existing.is_earned = true;
                existing.date_earned = Some(at);
            }
            return;
        }
        self.achievements
            .push(AchievementState::earned(achievement_id, at));
    }

    // ------------------------------------------------------------------
    // Attempts
    // ------------------------------------------------------------------

    /// Appends to the bounded history, evicting the oldest entry when the
    /// cap is reached.
    pub fn record_attempt(&mut self, attempt: AttemptRecord) {
        self.recent_attempts.push(attempt);
        while self.recent_attempts.len() > MAX_RECENT_ATTEMPTS {
            self.recent_attempts.remove(0);
        }
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    pub fn cooldown(&self, tower_id: u32) -> Option<&CooldownState> {
        self.cooldowns
            .iter()
            .find(|c| c.tower_id == tower_id && c.owner_id == self.owner_id)
    }

    /// Keyed upsert per `(tower_id, owner_id)`.
    pub fn touch_cooldown(&mut self, tower_id: u32, played_at: DateTime<Utc>) {
        let owner_id = self.owner_id.clone();
        if let Some(existing) = self
            .cooldowns
            .iter_mut()
            .find(|c| c.tower_id == tower_id && c.owner_id == owner_id)
        {
            if played_at > existing.last_played {
                existing.last_played = played_at;
            }
            return;
        }
        self.cooldowns
            .push(CooldownState::new(tower_id, owner_id, played_at));
    }

    // ------------------------------------------------------------------
    // Normalization
    // ------------------------------------------------------------------

    /// Re-establishes every structural invariant in place and leaves the
    /// keyed lists in a canonical order, so encoding a logically equal
    /// record always yields identical text.
    pub fn normalize(&mut self) {
        self.schema_version = SCHEMA_VERSION;

        let mut towers: BTreeMap<u32, TowerState> = BTreeMap::new();
        for tower in self.towers.drain(..) {
            towers
                .entry(tower.tower_id)
                .and_modify(|kept| *kept = kept.combined(&tower))
                .or_insert(tower);
        }
        self.towers = towers.into_values().collect();

        let mut achievements: BTreeMap<String, AchievementState> = BTreeMap::new();
        for achievement in self.achievements.drain(..) {
            achievements
                .entry(achievement.achievement_id.clone())
                .and_modify(|kept| *kept = kept.combined(&achievement))
                .or_insert(achievement);
        }
        self.achievements = achievements.into_values().collect();

        let mut cooldowns: BTreeMap<(u32, String), CooldownState> = BTreeMap::new();
        for cooldown in self.cooldowns.drain(..) {
            cooldowns
                .entry((cooldown.tower_id, cooldown.owner_id.clone()))
                .and_modify(|kept| *kept = kept.combined(&cooldown))
                .or_insert(cooldown);
        }
        self.cooldowns = cooldowns.into_values().collect();

        self.recent_attempts
            .sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        self.recent_attempts.dedup();
        self.recent_attempts.truncate(MAX_RECENT_ATTEMPTS);

        self.stamina.clamp();
    }
}
