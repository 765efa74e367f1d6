//! External integrations and local side-effect implementations:
//! achievement API client, feed cache writer, and notification channels.

pub mod achievement;
pub mod feed_cache;
pub mod notify;

pub use achievement::AchievementClient;
pub use feed_cache::{CachedPost, JsonFeedCache};
pub use notify::{ChannelNotifier, ChannelObserver, TracingNotifier};
