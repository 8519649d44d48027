// ============================================================================
// towervault — save persistence & sync core
// ============================================================================

//! Crash-safe save persistence and cloud sync for a single-player
//! tower-progression game.
//!
//! One [`SaveContext`] is constructed at process start; gameplay code
//! mutates the shared [`SaveRecord`] through it, the store autosaves the
//! record atomically to disk, and the sync coordinator reconciles it
//! against a remote copy whenever connectivity allows.
//!
//! ```no_run
//! use std::sync::Arc;
//! use towervault::{MemoryGateway, SaveConfig, SaveContext};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let context = SaveContext::new(SaveConfig::new("saves"), Arc::new(MemoryGateway::offline()));
//! let _record = context.load().await;
//!
//! context.mutate(|record| record.user.highest_score = 120).await;
//! context.autosave_tick().await;
//! # }
//! ```

pub mod codec;
pub mod core;
pub mod events;
pub mod facade;
pub mod model;
pub mod prelude;
pub mod resolve;
pub mod store;
pub mod sync;

// Re-export main types for convenience
pub use core::{Result, SaveError};
pub use events::{EventBus, SaveEvent};
pub use facade::{SaveConfig, SaveContext};
pub use model::{
    AchievementState, AttemptRecord, CooldownState, SaveRecord, StaminaState, TowerState,
    UserProfile,
};
pub use resolve::{Strategy, resolve};
pub use store::{SavePaths, SaveStore};
pub use sync::SyncCoordinator;
pub use sync::gateway::{MemoryGateway, RemoteSaveGateway};
