use serde::{Deserialize, Serialize};

/// Core player profile carried inside the save record.
///
/// `password_hash` is an opaque string owned by the account system; this
/// crate only persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub password_hash: String,
    pub highest_score: u32,
    pub current_tower: u32,
    pub sound_enabled: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: "player".to_string(),
            password_hash: String::new(),
            highest_score: 0,
            current_tower: 1,
            sound_enabled: true,
        }
    }
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}
