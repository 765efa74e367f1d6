//! Side-effect dispatch: goal linkage and the external achievement report.
//!
//! Both effects gate independently and both are always attempted; a failure
//! in one never blocks the other. Under the default best-effort policy a
//! failure is surfaced through the notifier and the finished post is kept;
//! under the fatal policy the first failure unwinds the submission.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use shelfie_core::config::SideEffectPolicy;
use shelfie_core::error::SubmitError;
use shelfie_core::models::events::Notice;
use shelfie_core::models::goal::AchievementPayload;
use shelfie_core::models::post::{DraftPost, PersistedPost};
use shelfie_core::ports::{AchievementSink, GoalLedger, Notifier};

pub(crate) async fn dispatch(
    draft: &DraftPost,
    post: &PersistedPost,
    goals: &Arc<dyn GoalLedger>,
    achievements: Option<&Arc<dyn AchievementSink>>,
    notifier: &Arc<dyn Notifier>,
    policy: SideEffectPolicy,
    timeout: Option<Duration>,
) -> Result<(), SubmitError> {
    let mut first_failure: Option<SubmitError> = None;

    if let Some(link) = &draft.goal {
        let result = bounded("goal linkage", timeout, async {
            goals
                .record_submission(link.goal_id, post.id)
                .await
                .map_err(|e| e.to_string())
        })
        .await;
        if let Err(detail) = result {
            tracing::warn!(goal_id = %link.goal_id, %detail, "goal linkage failed");
            notifier.notify(Notice::warning(format!(
                "Goal progress was not updated: {}",
                detail
            )));
            first_failure.get_or_insert(SubmitError::SideEffect {
                effect: "goal linkage",
                detail,
            });
        }
    }

    if let (Some(sink), Some(link)) = (achievements, draft.goal.as_ref()) {
        if let Some(payload) = AchievementPayload::from_post(link, post, Utc::now().date_naive()) {
            match bounded("achievement report", timeout, sink.report(&payload)).await {
                Ok(()) => {
                    if let Some(account_ref) = &link.account_ref {
                        let marked = bounded(
                            "account submission",
                            timeout,
                            sink.mark_account_submitted(account_ref, post.id),
                        )
                        .await;
                        if let Err(detail) = marked {
                            tracing::warn!(account_ref = %account_ref, %detail, "account submission failed");
                            notifier.notify(Notice::warning(format!(
                                "Achievement recorded but the account was not marked: {}",
                                detail
                            )));
                            first_failure.get_or_insert(SubmitError::SideEffect {
                                effect: "account submission",
                                detail,
                            });
                        }
                    }
                }
                Err(detail) => {
                    tracing::warn!(%detail, "achievement report failed");
                    notifier.notify(Notice::warning(format!(
                        "Achievement was not reported: {}",
                        detail
                    )));
                    first_failure.get_or_insert(SubmitError::SideEffect {
                        effect: "achievement report",
                        detail,
                    });
                }
            }
        }
    }

    match (policy, first_failure) {
        (SideEffectPolicy::Fatal, Some(err)) => Err(err),
        _ => Ok(()),
    }
}

async fn bounded<F>(
    operation: &'static str,
    timeout: Option<Duration>,
    fut: F,
) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(format!("{} timed out after {:?}", operation, limit)),
        },
        None => fut.await,
    }
}
