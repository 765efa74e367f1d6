//! Repository implementations for database operations.
//!
//! Each repository owns a specific domain entity: `posts` holds the post
//! document lifecycle (stage, patch, delete), `goals` the goal submission
//! records.

pub mod goals;
pub mod posts;

pub use goals::GoalRepository;
pub use posts::PostRepository;
