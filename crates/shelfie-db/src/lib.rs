//! Database repositories for the post document store and goal ledger.

pub mod db;

pub use db::{GoalRepository, PostRepository};
