//! Image processing for post submissions: variant planning and transcoding.

pub mod transcode;
pub mod variant;

pub use transcode::{load_source, EncodedImage, LoadError, SourceImage, TranscodeError, Transcoder};
pub use variant::{TargetBox, VariantPlan};
