//! Shelfie Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! side-effect ports shared across all Shelfie components.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

// Re-export commonly used types
pub use config::{ImageConfig, SideEffectPolicy, SubmitConfig};
pub use error::{ConfigError, StoreError, SubmitError};
pub use models::events::{Notice, Severity, SubmitEvent, SubmitPhase};
pub use models::goal::{AchievementPayload, GoalLink};
pub use models::post::{DraftPost, PersistedPost, PostImageUrls, Variant};
pub use ports::{
    AchievementSink, FeedCache, GoalLedger, NoOpFeedCache, NoOpNotifier, NoOpObserver, Notifier,
    PostStore, SubmitObserver,
};
