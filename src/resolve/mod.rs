//! Conflict resolution between the local save record and a remote copy.
//!
//! `resolve` is a pure function: inputs are never mutated and the outcome
//! is fully determined by its arguments (`now` is injected rather than
//! read from the clock so merges are reproducible).

use crate::core::types::MAX_RECENT_ATTEMPTS;
use crate::model::{AchievementState, AttemptRecord, CooldownState, SaveRecord, TowerState};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Policy for combining two divergent copies of a save record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Keep the local copy wholesale.
    UseLocal,
    /// Keep the remote copy wholesale.
    UseRemote,
    /// Keep whichever copy was saved later; ties resolve to local.
    #[default]
    UseNewer,
    /// Field-by-field merge in which progress never regresses.
    Merge,
}

pub fn resolve(
    local: &SaveRecord,
    remote: Option<&SaveRecord>,
    strategy: Strategy,
    now: DateTime<Utc>,
) -> SaveRecord {
    let Some(remote) = remote else {
        return local.clone();
    };
    match strategy {
        Strategy::UseLocal => local.clone(),
        Strategy::UseRemote => remote.clone(),
        Strategy::UseNewer => {
            if remote.last_save_time > local.last_save_time {
                remote.clone()
            } else {
                local.clone()
            }
        }
        Strategy::Merge => merge(local, remote, now),
    }
}

fn merge(local: &SaveRecord, remote: &SaveRecord, now: DateTime<Utc>) -> SaveRecord {
    // Fields with no merge rule of their own (username, credentials, sound
    // setting) follow the side saved later; ties keep local. owner_id is
    // immutable and always stays local.
    let mut user = if remote.last_save_time > local.last_save_time {
        remote.user.clone()
    } else {
        local.user.clone()
    };
    user.highest_score = local.user.highest_score.max(remote.user.highest_score);
    user.current_tower = local.user.current_tower.max(remote.user.current_tower);

    let stamina = if remote.stamina.current > local.stamina.current {
        remote.stamina.clone()
    } else {
        local.stamina.clone()
    };

    let mut merged = SaveRecord {
        owner_id: local.owner_id.clone(),
        schema_version: local.schema_version.max(remote.schema_version),
        user,
        towers: merge_towers(&local.towers, &remote.towers),
        achievements: merge_achievements(&local.achievements, &remote.achievements),
        recent_attempts: merge_attempts(&local.recent_attempts, &remote.recent_attempts),
        stamina,
        cooldowns: merge_cooldowns(&local.cooldowns, &remote.cooldowns),
        last_save_time: now,
    };
    merged.normalize();
    merged
}

/// Union by `tower_id`; unlocking is monotonic and floor progress never
/// regresses.
fn merge_towers(local: &[TowerState], remote: &[TowerState]) -> Vec<TowerState> {
    let mut by_id: BTreeMap<u32, TowerState> = BTreeMap::new();
    for tower in local.iter().chain(remote) {
        by_id
            .entry(tower.tower_id)
            .and_modify(|kept| *kept = kept.combined(tower))
            .or_insert_with(|| tower.clone());
    }
    by_id.into_values().collect()
}

/// Union by `achievement_id`, earned entries only; when both sides earned
/// the same achievement the earlier date wins (first earn is historically
/// meaningful).
fn merge_achievements(
    local: &[AchievementState],
    remote: &[AchievementState],
) -> Vec<AchievementState> {
    let mut by_id: BTreeMap<String, AchievementState> = BTreeMap::new();
    for achievement in local.iter().chain(remote) {
        if !achievement.is_earned {
            continue;
        }
        by_id
            .entry(achievement.achievement_id.clone())
            .and_modify(|kept| *kept = kept.combined(achievement))
            .or_insert_with(|| achievement.clone());
    }
    by_id.into_values().collect()
}

/// Union of both histories, newest first, bounded. Exact duplicates (the
/// same attempt synced back) collapse to one entry.
fn merge_attempts(local: &[AttemptRecord], remote: &[AttemptRecord]) -> Vec<AttemptRecord> {
    let mut attempts: Vec<AttemptRecord> = local.iter().chain(remote).cloned().collect();
    attempts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    attempts.dedup();
    attempts.truncate(MAX_RECENT_ATTEMPTS);
    attempts
}

/// Union by `(tower_id, owner_id)`; the later `last_played` wins so the
/// stricter cooldown survives the merge.
fn merge_cooldowns(local: &[CooldownState], remote: &[CooldownState]) -> Vec<CooldownState> {
    let mut by_key: BTreeMap<(u32, String), CooldownState> = BTreeMap::new();
    for cooldown in local.iter().chain(remote) {
        by_key
            .entry((cooldown.tower_id, cooldown.owner_id.clone()))
            .and_modify(|kept| *kept = kept.combined(cooldown))
            .or_insert_with(|| cooldown.clone());
    }
    by_key.into_values().collect()
}
