//! Structural validation applied after a successful decode. A record that
//! fails here is treated by callers exactly like a decode failure.

use crate::core::types::MAX_RECENT_ATTEMPTS;
use crate::core::{Result, SaveError};
use crate::model::SaveRecord;
use std::collections::HashSet;

pub fn validate(record: &SaveRecord) -> Result<()> {
    if record.owner_id.trim().is_empty() {
        return Err(SaveError::Validation("owner_id is empty".to_string()));
    }
    if record.user.username.trim().is_empty() {
        return Err(SaveError::Validation("username is empty".to_string()));
    }
    if record.stamina.current > record.stamina.max {
        return Err(SaveError::Validation(format!(
            "stamina {} exceeds max {}",
            record.stamina.current, record.stamina.max
        )));
    }
    if record.recent_attempts.len() > MAX_RECENT_ATTEMPTS {
        return Err(SaveError::Validation(format!(
            "attempt history holds {} entries, cap is {}",
            record.recent_attempts.len(),
            MAX_RECENT_ATTEMPTS
        )));
    }

    let mut tower_ids = HashSet::new();
    for tower in &record.towers {
        if !tower_ids.insert(tower.tower_id) {
            return Err(SaveError::Validation(format!(
                "duplicate tower entry for id {}",
                tower.tower_id
            )));
        }
    }

    let mut achievement_ids = HashSet::new();
    for achievement in &record.achievements {
        if !achievement_ids.insert(achievement.achievement_id.as_str()) {
            return Err(SaveError::Validation(format!(
                "duplicate achievement entry for '{}'",
                achievement.achievement_id
            )));
        }
    }

    let mut cooldown_keys = HashSet::new();
    for cooldown in &record.cooldowns {
        if !cooldown_keys.insert((cooldown.tower_id, cooldown.owner_id.as_str())) {
            return Err(SaveError::Validation(format!(
                "duplicate cooldown entry for tower {} owner '{}'",
                cooldown.tower_id, cooldown.owner_id
            )));
        }
    }

    Ok(())
}
