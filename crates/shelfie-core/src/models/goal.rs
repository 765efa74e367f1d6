use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::post::PersistedPost;

/// Optional relationship from a draft post to a tracked sales goal.
///
/// `goal_id` drives the internal submission-record update;
/// `opportunity_id` (plus a configured API key) gates the external
/// achievement report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalLink {
    pub goal_id: Uuid,
    pub opportunity_id: Option<String>,
    pub title: String,
    pub close_date: Option<NaiveDate>,
    pub closed_units: i32,
    /// External-system account reference, marked submitted after a
    /// successful achievement report.
    pub account_ref: Option<String>,
}

/// One-shot record reporting a fulfilled goal to the external tracker.
/// Derived from a finished post; sent at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementPayload {
    pub opportunity_id: String,
    pub goal_title: String,
    pub closed_by: String,
    pub close_date: NaiveDate,
    pub closed_units: i32,
    /// Single element: the final resized image URL.
    pub photos: Vec<String>,
}

impl AchievementPayload {
    /// Build the payload for a finished post. Returns `None` when the link
    /// carries no opportunity id. A missing close date defaults to `today`.
    pub fn from_post(link: &GoalLink, post: &PersistedPost, today: NaiveDate) -> Option<Self> {
        let opportunity_id = link.opportunity_id.clone()?;
        Some(AchievementPayload {
            opportunity_id,
            goal_title: link.title.clone(),
            closed_by: post.author_name.clone(),
            close_date: link.close_date.unwrap_or(today),
            closed_units: link.closed_units,
            photos: vec![post.image_url.clone()],
        })
    }
}
