use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::goal::GoalLink;

/// One of the two differently-sized re-encodings of the same source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Original,
    Resized,
}

impl Variant {
    /// File stem used in storage keys (`original.jpg` / `resized.jpg`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Original => "original",
            Variant::Resized => "resized",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post under construction. Lives only in memory; discarded on cancel,
/// superseded by a [`PersistedPost`] on successful submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DraftPost {
    pub author_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub author_name: String,
    pub account_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub account_name: String,
    pub brands: Vec<String>,
    #[validate(length(max = 2000))]
    pub description: String,
    pub goal: Option<GoalLink>,
}

/// The pair of download URLs produced by a finished submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImageUrls {
    pub original: String,
    pub resized: String,
}

/// A durably persisted post document.
///
/// Created with empty image URLs, patched exactly once with the final URLs
/// and a server-generated `created_at`, and never mutated again by the
/// submission pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct PersistedPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub account_id: Uuid,
    pub account_name: String,
    pub brands: Vec<String>,
    pub description: String,
    /// Display-size (resized) image URL; empty while staged.
    pub image_url: String,
    /// Full-size image URL; empty while staged.
    pub original_image_url: String,
    pub goal_id: Option<Uuid>,
    /// Stamped by the store when the image URLs are attached.
    pub created_at: Option<DateTime<Utc>>,
}

impl PersistedPost {
    /// True once the final URL patch has been applied.
    pub fn has_images(&self) -> bool {
        !self.image_url.is_empty() && !self.original_image_url.is_empty()
    }
}
