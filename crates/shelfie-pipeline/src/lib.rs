//! Post-submission pipeline.
//!
//! Turns a [`DraftPost`](shelfie_core::DraftPost) and one locally selected
//! image into a durably persisted, two-asset post: stage a placeholder
//! document, transcode and upload both variants with unified progress,
//! patch the document with the final URLs, mirror it to the local feed
//! cache, and dispatch the goal/achievement side effects. Any fatal failure
//! after staging triggers a compensating delete so no half-written record
//! survives.

pub mod progress;
mod side_effects;
mod state;
pub mod submit;

pub use progress::ProgressAggregator;
pub use submit::SubmitPipeline;
