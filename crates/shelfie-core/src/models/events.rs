//! Submission phases and the caller-facing event surface.
//!
//! The pipeline is an explicit state machine rather than nested error
//! handling: each submission walks the phase sequence below, any non-terminal
//! phase may fail, and failures after `Staged` route through
//! `CompensatingDelete` so no placeholder record outlives its submission.

use serde::{Deserialize, Serialize};

/// Phase of one submission. Terminal phases: `Complete`, `Failed`,
/// `CleanupFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPhase {
    Idle,
    /// Placeholder document written; durable id obtained.
    Staged,
    TranscodingOriginal,
    UploadingOriginal,
    TranscodingResized,
    UploadingResized,
    Patching,
    /// Final URLs attached and creation time stamped.
    Patched,
    SideEffects,
    Complete,
    /// Removing the staged document after a fatal error.
    CompensatingDelete,
    Failed,
    /// The compensating delete itself failed; the record may be orphaned.
    CleanupFailed,
}

impl SubmitPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmitPhase::Complete | SubmitPhase::Failed | SubmitPhase::CleanupFailed
        )
    }

    /// Human-readable status line for progress UIs.
    pub fn status_text(&self) -> &'static str {
        match self {
            SubmitPhase::Idle => "Preparing post",
            SubmitPhase::Staged => "Post record created",
            SubmitPhase::TranscodingOriginal => "Preparing photo 1 of 2",
            SubmitPhase::UploadingOriginal => "Uploading photo 1 of 2",
            SubmitPhase::TranscodingResized => "Preparing photo 2 of 2",
            SubmitPhase::UploadingResized => "Uploading photo 2 of 2",
            SubmitPhase::Patching => "Finalizing post",
            SubmitPhase::Patched => "Post finalized",
            SubmitPhase::SideEffects => "Updating goal progress",
            SubmitPhase::Complete => "Posted",
            SubmitPhase::CompensatingDelete => "Post failed, cleaning up",
            SubmitPhase::Failed => "Post failed",
            SubmitPhase::CleanupFailed => "Post failed and cleanup failed; contact support",
        }
    }

    /// Whether `next` is a legal successor of `self`.
    ///
    /// Any non-terminal phase may move straight to `Failed` (pre-stage
    /// errors need no cleanup); phases from `Staged` onward normally fail
    /// via `CompensatingDelete` instead.
    pub fn can_transition_to(self, next: SubmitPhase) -> bool {
        use SubmitPhase::*;
        if self.is_terminal() {
            return false;
        }
        if next == Failed && self != CompensatingDelete {
            return true;
        }
        matches!(
            (self, next),
            (Idle, Staged)
                | (Staged, TranscodingOriginal)
                | (TranscodingOriginal, UploadingOriginal)
                | (UploadingOriginal, TranscodingResized)
                | (TranscodingResized, UploadingResized)
                | (UploadingResized, Patching)
                | (Patching, Patched)
                | (Patched, SideEffects)
                | (SideEffects, Complete)
                | (Staged, CompensatingDelete)
                | (TranscodingOriginal, CompensatingDelete)
                | (UploadingOriginal, CompensatingDelete)
                | (TranscodingResized, CompensatingDelete)
                | (UploadingResized, CompensatingDelete)
                | (Patching, CompensatingDelete)
                | (Patched, CompensatingDelete)
                | (SideEffects, CompensatingDelete)
                | (CompensatingDelete, Failed)
                | (CompensatingDelete, CleanupFailed)
        )
    }
}

/// Event emitted to the caller's [`SubmitObserver`](crate::ports::SubmitObserver).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SubmitEvent {
    Phase {
        phase: SubmitPhase,
        status: &'static str,
    },
    Progress {
        /// 0–100; non-decreasing within one submission, 100 only at completion.
        percent: u8,
        transferred_bytes: u64,
        expected_bytes: u64,
    },
}

/// Severity of an out-of-band notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Transient, non-fatal notice delivered outside the submission result
/// (side-effect failures, dual-failure alerts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Critical,
            message: message.into(),
        }
    }
}
