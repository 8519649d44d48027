pub mod progress;
pub mod record;
pub mod user;
pub mod vitals;

pub use progress::{AchievementState, AttemptRecord, TowerState};
pub use record::SaveRecord;
pub use user::UserProfile;
pub use vitals::{CooldownState, StaminaState};
