/// Conflict resolver tests
///
/// Run with: cargo test --test resolve_tests
use chrono::{DateTime, TimeZone, Utc};
use towervault::core::types::MAX_RECENT_ATTEMPTS;
use towervault::{
    AchievementState, AttemptRecord, CooldownState, SaveRecord, Strategy, TowerState, resolve,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn record(owner: &str, saved_at: i64) -> SaveRecord {
    let mut record = SaveRecord::new(owner);
    record.last_save_time = at(saved_at);
    record
}

fn attempt(secs: i64, score: u32) -> AttemptRecord {
    AttemptRecord {
        tower_id: 1,
        score,
        floor_reached: 2,
        completed_at: at(secs),
    }
}

#[test]
fn test_absent_remote_returns_local_unchanged() {
    let local = record("device-a", 1_000);
    for strategy in [
        Strategy::UseLocal,
        Strategy::UseRemote,
        Strategy::UseNewer,
        Strategy::Merge,
    ] {
        assert_eq!(resolve(&local, None, strategy, at(9_999)), local);
    }
}

#[test]
fn test_use_local_and_use_remote() {
    let local = record("device-a", 1_000);
    let mut remote = record("device-a", 2_000);
    remote.user.highest_score = 55;

    assert_eq!(resolve(&local, Some(&remote), Strategy::UseLocal, at(0)), local);
    assert_eq!(resolve(&local, Some(&remote), Strategy::UseRemote, at(0)), remote);
}

#[test]
fn test_use_newer_picks_later_save() {
    let mut local = record("device-a", 1_000);
    local.user.highest_score = 10;
    let mut remote = record("device-a", 2_000);
    remote.user.highest_score = 20;

    let resolved = resolve(&local, Some(&remote), Strategy::UseNewer, at(0));
    assert_eq!(resolved.user.highest_score, 20);
}

#[test]
fn test_use_newer_tie_resolves_to_local() {
    let mut local = record("device-a", 1_000);
    local.user.highest_score = 10;
    let mut remote = record("device-a", 1_000);
    remote.user.highest_score = 20;

    let resolved = resolve(&local, Some(&remote), Strategy::UseNewer, at(0));
    assert_eq!(resolved.user.highest_score, 10);
}

#[test]
fn test_merge_scores_and_towers_never_regress() {
    // Local is ahead on score, remote is ahead on tower progression.
    let mut local = record("device-a", 1_000);
    local.user.highest_score = 100;
    local.user.current_tower = 2;
    let mut remote = record("device-a", 1_000);
    remote.user.highest_score = 80;
    remote.user.current_tower = 3;

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(5_000));
    assert_eq!(merged.user.highest_score, 100);
    assert_eq!(merged.user.current_tower, 3);
    assert_eq!(merged.last_save_time, at(5_000));
    assert_eq!(merged.owner_id, local.owner_id);
}

#[test]
fn test_merge_tower_unlock_is_monotonic() {
    let mut local = record("device-a", 1_000);
    local.towers = vec![
        TowerState {
            tower_id: 2,
            is_unlocked: true,
            highest_floor: 3,
        },
        TowerState {
            tower_id: 4,
            is_unlocked: false,
            highest_floor: 0,
        },
    ];
    let mut remote = record("device-a", 1_000);
    remote.towers = vec![
        TowerState {
            tower_id: 2,
            is_unlocked: false,
            highest_floor: 9,
        },
        TowerState {
            tower_id: 7,
            is_unlocked: true,
            highest_floor: 1,
        },
    ];

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(2_000));
    let tower = |id: u32| merged.towers.iter().find(|t| t.tower_id == id).unwrap();
    assert!(tower(2).is_unlocked);
    assert_eq!(tower(2).highest_floor, 9);
    assert!(!tower(4).is_unlocked);
    assert!(tower(7).is_unlocked);
}

#[test]
fn test_merge_achievements_first_earned_wins() {
    let mut local = record("device-a", 1_000);
    local.achievements = vec![
        AchievementState::earned("first_clear", at(500)),
        AchievementState {
            achievement_id: "never_earned".to_string(),
            is_earned: false,
            date_earned: None,
        },
    ];
    let mut remote = record("device-a", 1_000);
    remote.achievements = vec![
        AchievementState::earned("first_clear", at(200)),
        AchievementState::earned("remote_only", at(800)),
    ];

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(2_000));
    let first = merged
        .achievements
        .iter()
        .find(|a| a.achievement_id == "first_clear")
        .unwrap();
    assert_eq!(first.date_earned, Some(at(200)));
    assert!(merged.achievements.iter().any(|a| a.achievement_id == "remote_only"));
    // Unearned entries never survive a merge.
    assert!(!merged.achievements.iter().any(|a| a.achievement_id == "never_earned"));
}

#[test]
fn test_merge_attempts_union_newest_first_bounded() {
    let mut local = record("device-a", 1_000);
    let mut remote = record("device-a", 1_000);
    for i in 0..MAX_RECENT_ATTEMPTS as i64 {
        local.recent_attempts.push(attempt(i * 2, 1));
        remote.recent_attempts.push(attempt(i * 2 + 1, 1));
    }
    // One attempt synced on both sides already.
    remote.recent_attempts.push(local.recent_attempts[5].clone());

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(2_000));
    assert_eq!(merged.recent_attempts.len(), MAX_RECENT_ATTEMPTS);
    for pair in merged.recent_attempts.windows(2) {
        assert!(pair[0].completed_at >= pair[1].completed_at);
    }
    // The survivors are the most recent attempts of the union.
    assert_eq!(
        merged.recent_attempts[0].completed_at,
        at((MAX_RECENT_ATTEMPTS as i64 - 1) * 2 + 1)
    );
}

#[test]
fn test_merge_stamina_higher_pool_travels_wholesale() {
    let mut local = record("device-a", 1_000);
    local.stamina.current = 1;
    local.stamina.last_regen_time = at(100);
    let mut remote = record("device-a", 1_000);
    remote.stamina.current = 4;
    remote.stamina.last_regen_time = at(700);

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(2_000));
    assert_eq!(merged.stamina.current, 4);
    // The winning side's regen clock travels with it.
    assert_eq!(merged.stamina.last_regen_time, at(700));
}

#[test]
fn test_merge_cooldowns_later_play_wins() {
    let mut local = record("device-a", 1_000);
    local.cooldowns = vec![CooldownState::new(1, "device-a", at(300))];
    let mut remote = record("device-a", 1_000);
    remote.cooldowns = vec![
        CooldownState::new(1, "device-a", at(600)),
        CooldownState::new(2, "device-a", at(100)),
    ];

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(2_000));
    assert_eq!(merged.cooldowns.len(), 2);
    let gate = merged
        .cooldowns
        .iter()
        .find(|c| c.tower_id == 1)
        .unwrap();
    assert_eq!(gate.last_played, at(600));
}

#[test]
fn test_merge_profile_extras_follow_newer_side() {
    let mut local = record("device-a", 1_000);
    local.user.sound_enabled = true;
    local.user.username = "old-name".to_string();
    let mut remote = record("device-a", 2_000);
    remote.user.sound_enabled = false;
    remote.user.username = "new-name".to_string();

    let merged = resolve(&local, Some(&remote), Strategy::Merge, at(3_000));
    assert!(!merged.user.sound_enabled);
    assert_eq!(merged.user.username, "new-name");
}

#[test]
fn test_resolve_never_mutates_inputs() {
    let mut local = record("device-a", 1_000);
    local.recent_attempts.push(attempt(10, 5));
    let mut remote = record("device-a", 2_000);
    remote.user.highest_score = 90;

    let local_before = local.clone();
    let remote_before = remote.clone();
    for strategy in [
        Strategy::UseLocal,
        Strategy::UseRemote,
        Strategy::UseNewer,
        Strategy::Merge,
    ] {
        let _ = resolve(&local, Some(&remote), strategy, at(9_000));
    }
    assert_eq!(local, local_before);
    assert_eq!(remote, remote_before);
}
