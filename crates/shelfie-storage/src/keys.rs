//! Shared key layout for submission assets.
//!
//! Key format: `images/<yyyy-mm-dd>/<userId>-<submissionEpochMs>/<variant>.<ext>`.
//! The prefix is derived once per submission; both variants share it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use shelfie_core::models::post::Variant;

/// Destination folder for one submission: date bucket plus a folder id from
/// the user and the submission timestamp.
pub fn submission_prefix(user_id: Uuid, submitted_at: DateTime<Utc>) -> String {
    format!(
        "images/{}/{}-{}",
        submitted_at.format("%Y-%m-%d"),
        user_id,
        submitted_at.timestamp_millis()
    )
}

/// Key of one variant blob under a submission prefix.
pub fn variant_key(prefix: &str, variant: Variant, extension: &str) -> String {
    format!("{}/{}.{}", prefix, variant.as_str(), extension)
}
