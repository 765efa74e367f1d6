//! Local feed cache.
//!
//! Finished posts are appended to an in-memory list mirrored to a JSON file
//! so the caller's feed shows a new post immediately, without a round-trip
//! to the document store. Server timestamps are normalized to RFC 3339
//! strings before they hit disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use shelfie_core::models::post::PersistedPost;
use shelfie_core::ports::FeedCache;

/// Serialized form of a cached post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub account_id: Uuid,
    pub account_name: String,
    pub brands: Vec<String>,
    pub description: String,
    pub image_url: String,
    pub original_image_url: String,
    pub goal_id: Option<Uuid>,
    /// RFC 3339; `None` only for posts cached before their patch (not
    /// produced by this pipeline).
    pub created_at: Option<String>,
}

impl From<&PersistedPost> for CachedPost {
    fn from(post: &PersistedPost) -> Self {
        CachedPost {
            id: post.id,
            author_id: post.author_id,
            author_name: post.author_name.clone(),
            account_id: post.account_id,
            account_name: post.account_name.clone(),
            brands: post.brands.clone(),
            description: post.description.clone(),
            image_url: post.image_url.clone(),
            original_image_url: post.original_image_url.clone(),
            goal_id: post.goal_id,
            created_at: post.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// File-backed feed cache. Upserts are keyed by post id, so a retried
/// submission step never duplicates an entry.
pub struct JsonFeedCache {
    path: PathBuf,
    entries: RwLock<Vec<CachedPost>>,
}

impl JsonFeedCache {
    /// Open the cache at `path`, loading any existing entries.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .with_context(|| format!("corrupt feed cache at {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", path.display()));
            }
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Snapshot of the cached feed, newest first.
    pub async fn posts(&self) -> Vec<CachedPost> {
        self.entries.read().await.clone()
    }

    async fn persist(&self, entries: &[CachedPost]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.ok();
        }
        let raw = serde_json::to_vec_pretty(entries).context("serialize feed cache")?;
        fs::write(&self.path, raw)
            .await
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl FeedCache for JsonFeedCache {
    async fn upsert(&self, post: &PersistedPost) -> Result<(), String> {
        let cached = CachedPost::from(post);
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id == cached.id) {
            Some(existing) => *existing = cached,
            None => entries.insert(0, cached),
        }
        self.persist(&entries).await.map_err(|e| e.to_string())
    }
}
