//! One-stop import for consumers of the save core.
//!
//! Gameplay systems normally need the context, the record types, and the
//! events; test code additionally reaches for [`MemoryGateway`] and
//! [`Strategy`].

pub use crate::core::{Result, SaveError};
pub use crate::events::SaveEvent;
pub use crate::facade::{SaveConfig, SaveContext};
pub use crate::model::{
    AchievementState, AttemptRecord, CooldownState, SaveRecord, StaminaState, TowerState,
    UserProfile,
};
pub use crate::resolve::Strategy;
pub use crate::sync::gateway::{MemoryGateway, RemoteSaveGateway};
