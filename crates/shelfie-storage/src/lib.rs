//! Blob storage for submission assets.
//!
//! Defines the [`Storage`] trait the upload orchestrator works against, the
//! shared submission key layout, and a local-filesystem backend.

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::{submission_prefix, variant_key};
pub use local::LocalStorage;
pub use traits::{ProgressFn, Storage, StorageError, StorageResult};
