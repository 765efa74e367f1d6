//! Error types module
//!
//! Submission errors are unified under [`SubmitError`]. Everything except
//! `SideEffect` is fatal: it unwinds to the caller and, once a post record has
//! been staged, triggers the compensating delete. `CleanupFailed` is the one
//! secondary failure: the compensating delete itself failed and the staged
//! record may be orphaned, so it must never be collapsed into the error that
//! caused the cleanup.

use std::time::Duration;

use uuid::Uuid;

use crate::models::post::Variant;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid draft post: {0}")]
    InvalidDraft(String),

    #[error("could not read source image: {0}")]
    Load(String),

    #[error("image transcode failed during {operation}: {detail}")]
    Transcode {
        operation: &'static str,
        detail: String,
    },

    #[error("upload of the {variant} image failed: {detail}")]
    Transfer { variant: Variant, detail: String },

    #[error("post record {operation} failed: {detail}")]
    DocumentWrite {
        operation: &'static str,
        detail: String,
    },

    #[error(
        "cleanup of post {post_id} failed after an earlier error ({cause}); \
         the record may be left in an indeterminate state: {detail}"
    )]
    CleanupFailed {
        post_id: Uuid,
        cause: Box<SubmitError>,
        detail: String,
    },

    #[error("{effect} side effect failed: {detail}")]
    SideEffect {
        effect: &'static str,
        detail: String,
    },

    #[error("{operation} did not finish within {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl SubmitError {
    /// Whether this error unwinds the submission. Side-effect failures are
    /// best-effort by default and only become fatal under
    /// [`SideEffectPolicy::Fatal`](crate::config::SideEffectPolicy).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SubmitError::SideEffect { .. })
    }
}

/// Errors from the post document store and goal ledger.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("record not found: {0}")]
    NotFound(Uuid),
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {detail}")]
    InvalidVar { var: &'static str, detail: String },
}
