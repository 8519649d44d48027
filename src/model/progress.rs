use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-tower unlock and progress flags. At most one entry exists per
/// `tower_id` within a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TowerState {
    pub tower_id: u32,
    pub is_unlocked: bool,
    pub highest_floor: u32,
}

impl TowerState {
    pub fn locked(tower_id: u32) -> Self {
        Self {
            tower_id,
            is_unlocked: false,
            highest_floor: 0,
        }
    }

    pub fn unlocked(tower_id: u32) -> Self {
        Self {
            tower_id,
            is_unlocked: true,
            highest_floor: 0,
        }
    }

    /// Monotonic combine: once either side is unlocked the result is
    /// unlocked, and floor progress never regresses.
    pub fn combined(&self, other: &TowerState) -> TowerState {
        TowerState {
            tower_id: self.tower_id,
            is_unlocked: self.is_unlocked || other.is_unlocked,
            highest_floor: self.highest_floor.max(other.highest_floor),
        }
    }
}

/// Earned status for one achievement. At most one entry exists per
/// `achievement_id` within a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub achievement_id: String,
    pub is_earned: bool,
    pub date_earned: Option<DateTime<Utc>>,
}

impl AchievementState {
    pub fn earned(achievement_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            achievement_id: achievement_id.into(),
            is_earned: true,
            date_earned: Some(at),
        }
    }

    /// Combine two entries for the same achievement: the earliest known
    /// earn date wins. An entry with a known date beats one without.
    pub fn combined(&self, other: &AchievementState) -> AchievementState {
        if !self.is_earned {
            return other.clone();
        }
        if !other.is_earned {
            return self.clone();
        }
        match (self.date_earned, other.date_earned) {
            (Some(a), Some(b)) if b < a => other.clone(),
            (None, Some(_)) => other.clone(),
            _ => self.clone(),
        }
    }
}

/// One completed tower run. History is bounded by `MAX_RECENT_ATTEMPTS`,
/// oldest evicted first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub tower_id: u32,
    pub score: u32,
    pub floor_reached: u32,
    pub completed_at: DateTime<Utc>,
}
