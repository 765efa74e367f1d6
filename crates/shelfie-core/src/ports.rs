//! Side-effect ports for the submission pipeline
//!
//! These trait interfaces let the orchestrator run against any document
//! store, goal tracker, cache, or notification surface without depending on
//! them. Concrete implementations live in `shelfie-db` and
//! `shelfie-services`; no-op implementations are provided for callers that
//! opt out of an integration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::events::{Notice, SubmitEvent};
use crate::models::goal::AchievementPayload;
use crate::models::post::{DraftPost, PersistedPost, PostImageUrls};

/// Durable post-document store.
///
/// A staged document has empty image URLs and no creation time; it becomes a
/// finished post through exactly one `attach_images` call, or disappears
/// through `delete`.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Write a placeholder document from the draft's descriptive fields and
    /// return its durable id.
    async fn stage(&self, draft: &DraftPost) -> Result<Uuid, StoreError>;

    /// Attach the final image URLs and stamp a server-generated creation
    /// time. Returns the patched post.
    async fn attach_images(
        &self,
        post_id: Uuid,
        urls: &PostImageUrls,
    ) -> Result<PersistedPost, StoreError>;

    /// Remove a staged document.
    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError>;
}

/// Internal goal tracker: records which post fulfilled a goal.
#[async_trait]
pub trait GoalLedger: Send + Sync {
    async fn record_submission(&self, goal_id: Uuid, post_id: Uuid) -> Result<(), StoreError>;
}

/// External achievement tracker.
#[async_trait]
pub trait AchievementSink: Send + Sync {
    /// Report a fulfilled goal. At most one report per submission.
    async fn report(&self, payload: &AchievementPayload) -> Result<(), String>;

    /// Mark the external account as submitted, linked to the given post.
    async fn mark_account_submitted(&self, account_ref: &str, post_id: Uuid) -> Result<(), String>;
}

/// Local feed cache for immediate visibility of finished posts.
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// Upsert by post id; retries must not create duplicate entries.
    async fn upsert(&self, post: &PersistedPost) -> Result<(), String>;
}

/// Transient notification surface for non-fatal problems.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Caller-facing observer for phase transitions and progress ticks.
pub trait SubmitObserver: Send + Sync {
    fn on_event(&self, event: SubmitEvent);
}

/// No-op cache for callers without local state.
pub struct NoOpFeedCache;

#[async_trait]
impl FeedCache for NoOpFeedCache {
    async fn upsert(&self, _post: &PersistedPost) -> Result<(), String> {
        Ok(())
    }
}

/// Notifier that drops all notices.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Observer that ignores all events.
pub struct NoOpObserver;

impl SubmitObserver for NoOpObserver {
    fn on_event(&self, _event: SubmitEvent) {}
}
