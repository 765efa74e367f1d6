//! The submission orchestrator.
//!
//! One `submit` call runs the whole flow: validate and decode, stage the
//! placeholder document, transcode and upload both variants sequentially
//! with unified progress, patch the document, mirror it to the feed cache,
//! dispatch side effects. Submissions serialize behind an internal mutex;
//! once a document is staged the flow runs to a terminal phase, deleting
//! the staged record on any fatal error.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tokio::task;
use uuid::Uuid;
use validator::Validate;

use shelfie_core::config::SubmitConfig;
use shelfie_core::error::SubmitError;
use shelfie_core::models::events::{Notice, SubmitPhase};
use shelfie_core::models::post::{DraftPost, PersistedPost, PostImageUrls, Variant};
use shelfie_core::ports::{
    AchievementSink, FeedCache, GoalLedger, Notifier, PostStore, SubmitObserver,
};
use shelfie_processing::{load_source, EncodedImage, SourceImage, TargetBox, Transcoder, VariantPlan};
use shelfie_storage::{keys, Storage};

use crate::progress::ProgressReporter;
use crate::side_effects;
use crate::state::PhaseTracker;

pub struct SubmitPipeline {
    storage: Arc<dyn Storage>,
    posts: Arc<dyn PostStore>,
    goals: Arc<dyn GoalLedger>,
    achievements: Option<Arc<dyn AchievementSink>>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<dyn FeedCache>,
    config: SubmitConfig,
    in_flight: tokio::sync::Mutex<()>,
}

impl SubmitPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        storage: Arc<dyn Storage>,
        posts: Arc<dyn PostStore>,
        goals: Arc<dyn GoalLedger>,
        achievements: Option<Arc<dyn AchievementSink>>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn FeedCache>,
        config: SubmitConfig,
    ) -> Self {
        Self {
            storage,
            posts,
            goals,
            achievements,
            notifier,
            cache,
            config,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Publish one draft post with its selected image.
    ///
    /// Returns the patched [`PersistedPost`] on success. Concurrent calls
    /// queue: a second submission cannot start while one is in flight.
    pub async fn submit(
        &self,
        draft: DraftPost,
        image: Bytes,
        observer: Arc<dyn SubmitObserver>,
    ) -> Result<PersistedPost, SubmitError> {
        let _guard = self.in_flight.lock().await;
        let mut tracker = PhaseTracker::start(observer.clone());

        if let Err(e) = draft.validate() {
            return Err(Self::fail(&mut tracker, SubmitError::InvalidDraft(e.to_string())));
        }

        let source = match Self::load(image).await {
            Ok(source) => source,
            Err(e) => return Err(Self::fail(&mut tracker, e)),
        };
        let plan = VariantPlan::for_source(source.width, source.height, &self.config.image);
        let submitted_at = Utc::now();

        let post_id = match self
            .bounded("post record create", async {
                self.posts
                    .stage(&draft)
                    .await
                    .map_err(|e| SubmitError::DocumentWrite {
                        operation: "create",
                        detail: e.to_string(),
                    })
            })
            .await
        {
            Ok(id) => id,
            Err(e) => return Err(Self::fail(&mut tracker, e)),
        };
        tracker.advance(SubmitPhase::Staged);
        tracing::info!(post_id = %post_id, "post staged");

        let prefix = keys::submission_prefix(draft.author_id, submitted_at);
        match self
            .finish(&draft, post_id, source, plan, &prefix, &mut tracker, observer)
            .await
        {
            Ok(post) => {
                tracker.advance(SubmitPhase::Complete);
                tracing::info!(post_id = %post.id, "post published");
                Ok(post)
            }
            Err(cause) => Err(self.compensate(&mut tracker, post_id, cause).await),
        }
    }

    /// Everything between Staged and Complete; errors here trigger the
    /// compensating delete.
    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        draft: &DraftPost,
        post_id: Uuid,
        source: Arc<SourceImage>,
        plan: VariantPlan,
        prefix: &str,
        tracker: &mut PhaseTracker,
        observer: Arc<dyn SubmitObserver>,
    ) -> Result<PersistedPost, SubmitError> {
        let progress = ProgressReporter::new(observer);
        let mut uploaded: Vec<String> = Vec::with_capacity(2);

        for variant in [Variant::Original, Variant::Resized] {
            tracker.advance(match variant {
                Variant::Original => SubmitPhase::TranscodingOriginal,
                Variant::Resized => SubmitPhase::TranscodingResized,
            });
            let encoded = self
                .transcode(Arc::clone(&source), plan.target_for(variant))
                .await?;
            progress.add_expected(encoded.len() as u64);

            tracker.advance(match variant {
                Variant::Original => SubmitPhase::UploadingOriginal,
                Variant::Resized => SubmitPhase::UploadingResized,
            });
            progress.begin_transfer(encoded.len() as u64);
            let key = keys::variant_key(prefix, variant, encoded.extension);
            let url = self
                .bounded("upload", async {
                    self.storage
                        .put(
                            &key,
                            encoded.content_type,
                            encoded.data.clone(),
                            Some(progress.callback()),
                        )
                        .await
                        .map_err(|e| SubmitError::Transfer {
                            variant,
                            detail: e.to_string(),
                        })
                })
                .await?;
            progress.complete_transfer();
            uploaded.push(url);
        }
        progress.finalize();

        tracker.advance(SubmitPhase::Patching);
        let urls = PostImageUrls {
            original: uploaded[0].clone(),
            resized: uploaded[1].clone(),
        };
        let post = self
            .bounded("post record patch", async {
                self.posts
                    .attach_images(post_id, &urls)
                    .await
                    .map_err(|e| SubmitError::DocumentWrite {
                        operation: "patch",
                        detail: e.to_string(),
                    })
            })
            .await?;
        tracker.advance(SubmitPhase::Patched);

        // Local visibility only; the durable record is already patched.
        if let Err(detail) = self.cache.upsert(&post).await {
            tracing::warn!(%detail, "feed cache update failed");
            self.notifier.notify(Notice::warning(format!(
                "New post will appear after a refresh: {}",
                detail
            )));
        }

        tracker.advance(SubmitPhase::SideEffects);
        side_effects::dispatch(
            draft,
            &post,
            &self.goals,
            self.achievements.as_ref(),
            &self.notifier,
            self.config.side_effect_policy,
            self.config.operation_timeout,
        )
        .await?;

        Ok(post)
    }

    /// Delete the staged document after a fatal error. A failed delete is
    /// reported as the distinct dual-failure, never as the original error.
    async fn compensate(
        &self,
        tracker: &mut PhaseTracker,
        post_id: Uuid,
        cause: SubmitError,
    ) -> SubmitError {
        tracker.advance(SubmitPhase::CompensatingDelete);
        tracing::warn!(post_id = %post_id, error = %cause, "submission failed, deleting staged post");

        let deleted = self
            .bounded("post record delete", async {
                self.posts
                    .delete(post_id)
                    .await
                    .map_err(|e| SubmitError::DocumentWrite {
                        operation: "delete",
                        detail: e.to_string(),
                    })
            })
            .await;

        match deleted {
            Ok(()) => {
                tracker.advance(SubmitPhase::Failed);
                self.notifier.notify(Notice::warning(format!(
                    "Post could not be published: {}",
                    cause
                )));
                cause
            }
            Err(delete_err) => {
                tracker.advance(SubmitPhase::CleanupFailed);
                tracing::error!(post_id = %post_id, error = %delete_err, "compensating delete failed");
                self.notifier.notify(Notice::critical(format!(
                    "Post failed and cleanup also failed; record {} may be stuck half-written. {}",
                    post_id, delete_err
                )));
                SubmitError::CleanupFailed {
                    post_id,
                    cause: Box::new(cause),
                    detail: delete_err.to_string(),
                }
            }
        }
    }

    fn fail(tracker: &mut PhaseTracker, err: SubmitError) -> SubmitError {
        tracker.advance(SubmitPhase::Failed);
        err
    }

    async fn load(image: Bytes) -> Result<Arc<SourceImage>, SubmitError> {
        let source = task::spawn_blocking(move || load_source(&image))
            .await
            .map_err(|e| SubmitError::Load(e.to_string()))?
            .map_err(|e| SubmitError::Load(e.0))?;
        Ok(Arc::new(source))
    }

    async fn transcode(
        &self,
        source: Arc<SourceImage>,
        target: TargetBox,
    ) -> Result<EncodedImage, SubmitError> {
        let quality = self.config.image.jpeg_quality;
        task::spawn_blocking(move || Transcoder::new(quality).encode_to_fit(&source, target))
            .await
            .map_err(|e| SubmitError::Transcode {
                operation: "transcode worker",
                detail: e.to_string(),
            })?
            .map_err(|e| SubmitError::Transcode {
                operation: e.operation,
                detail: e.detail,
            })
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, SubmitError>
    where
        F: Future<Output = Result<T, SubmitError>>,
    {
        match self.config.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(SubmitError::Timeout {
                    operation,
                    timeout: limit,
                }),
            },
            None => fut.await,
        }
    }
}
