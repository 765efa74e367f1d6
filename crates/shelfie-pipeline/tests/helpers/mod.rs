//! In-memory fakes for the pipeline's ports, plus draft/image fixtures.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use image::{ImageFormat, Rgba, RgbaImage};
use uuid::Uuid;

use shelfie_core::config::{ImageConfig, SubmitConfig};
use shelfie_core::error::StoreError;
use shelfie_core::models::events::{Notice, SubmitEvent, SubmitPhase};
use shelfie_core::models::goal::{AchievementPayload, GoalLink};
use shelfie_core::models::post::{DraftPost, PersistedPost, PostImageUrls};
use shelfie_core::ports::{
    AchievementSink, FeedCache, GoalLedger, Notifier, PostStore, SubmitObserver,
};
use shelfie_pipeline::SubmitPipeline;
use shelfie_storage::{ProgressFn, Storage, StorageError, StorageResult};

/// Encode a solid-color PNG of the given dimensions.
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba([90, 120, 30, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    Bytes::from(buf)
}

/// Small target boxes keep test transcodes fast; orientation behavior is
/// unchanged.
pub fn test_config() -> SubmitConfig {
    SubmitConfig {
        image: ImageConfig {
            original_box: (160, 120),
            resized_box: (80, 60),
            jpeg_quality: 75,
        },
        ..SubmitConfig::default()
    }
}

pub fn draft(goal: Option<GoalLink>) -> DraftPost {
    DraftPost {
        author_id: Uuid::new_v4(),
        author_name: "Dana Reyes".to_string(),
        account_id: Uuid::new_v4(),
        account_name: "Westside Market".to_string(),
        brands: vec!["Acme Cola".to_string()],
        description: "End-cap display, aisle 4".to_string(),
        goal,
    }
}

pub fn goal_link(opportunity_id: Option<&str>, account_ref: Option<&str>) -> GoalLink {
    GoalLink {
        goal_id: Uuid::new_v4(),
        opportunity_id: opportunity_id.map(str::to_string),
        title: "Q3 end-cap push".to_string(),
        close_date: None,
        closed_units: 12,
        account_ref: account_ref.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Storage fake

#[derive(Default)]
pub struct MemoryStorage {
    pub blobs: Mutex<HashMap<String, Bytes>>,
    /// Puts whose key contains this fragment fail mid-transfer.
    pub fail_key_containing: Option<&'static str>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(fragment: &'static str) -> Arc<Self> {
        Arc::new(Self {
            blobs: Mutex::new(HashMap::new()),
            fail_key_containing: Some(fragment),
        })
    }

    pub fn blob(&self, key_fragment: &str) -> Option<Bytes> {
        self.blobs
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k.contains(key_fragment))
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        data: Bytes,
        progress: Option<ProgressFn>,
    ) -> StorageResult<String> {
        if let Some(fragment) = self.fail_key_containing {
            if key.contains(fragment) {
                if let Some(report) = &progress {
                    report((data.len() / 2) as u64);
                }
                return Err(StorageError::UploadFailed("connection reset".to_string()));
            }
        }
        if let Some(report) = &progress {
            report((data.len() / 2) as u64);
            report(data.len() as u64);
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), data);
        Ok(format!("mem://{}", key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.blobs.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }
}

// ---------------------------------------------------------------------------
// Document store fake

#[derive(Default)]
pub struct MemoryPostStore {
    pub docs: Mutex<HashMap<Uuid, PersistedPost>>,
    pub fail_delete: AtomicBool,
}

impl MemoryPostStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_failing_delete() -> Arc<Self> {
        let store = Self::default();
        store.fail_delete.store(true, Ordering::SeqCst);
        Arc::new(store)
    }

    pub fn count(&self) -> usize {
        self.docs.lock().unwrap().len()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn stage(&self, draft: &DraftPost) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let staged = PersistedPost {
            id,
            author_id: draft.author_id,
            author_name: draft.author_name.clone(),
            account_id: draft.account_id,
            account_name: draft.account_name.clone(),
            brands: draft.brands.clone(),
            description: draft.description.clone(),
            image_url: String::new(),
            original_image_url: String::new(),
            goal_id: draft.goal.as_ref().map(|g| g.goal_id),
            created_at: None,
        };
        self.docs.lock().unwrap().insert(id, staged);
        Ok(id)
    }

    async fn attach_images(
        &self,
        post_id: Uuid,
        urls: &PostImageUrls,
    ) -> Result<PersistedPost, StoreError> {
        let mut docs = self.docs.lock().unwrap();
        let doc = docs.get_mut(&post_id).ok_or(StoreError::NotFound(post_id))?;
        doc.image_url = urls.resized.clone();
        doc.original_image_url = urls.original.clone();
        doc.created_at = Some(Utc::now());
        Ok(doc.clone())
    }

    async fn delete(&self, post_id: Uuid) -> Result<(), StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::Database("permission denied".to_string()));
        }
        self.docs.lock().unwrap().remove(&post_id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Side-effect fakes

#[derive(Default)]
pub struct RecordingGoalLedger {
    pub calls: Mutex<Vec<(Uuid, Uuid)>>,
    pub fail: bool,
}

impl RecordingGoalLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl GoalLedger for RecordingGoalLedger {
    async fn record_submission(&self, goal_id: Uuid, post_id: Uuid) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push((goal_id, post_id));
        if self.fail {
            return Err(StoreError::Database("goal row gone".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAchievements {
    pub reports: Mutex<Vec<AchievementPayload>>,
    pub marked: Mutex<Vec<(String, Uuid)>>,
}

impl RecordingAchievements {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AchievementSink for RecordingAchievements {
    async fn report(&self, payload: &AchievementPayload) -> Result<(), String> {
        self.reports.lock().unwrap().push(payload.clone());
        Ok(())
    }

    async fn mark_account_submitted(&self, account_ref: &str, post_id: Uuid) -> Result<(), String> {
        self.marked
            .lock()
            .unwrap()
            .push((account_ref.to_string(), post_id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Observer / notifier / cache fakes

#[derive(Default)]
pub struct CollectingObserver {
    pub events: Mutex<Vec<SubmitEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn phases(&self) -> Vec<SubmitPhase> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SubmitEvent::Phase { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SubmitEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }
}

impl SubmitObserver for CollectingObserver {
    fn on_event(&self, event: SubmitEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingFeedCache {
    pub posts: Mutex<Vec<PersistedPost>>,
}

impl RecordingFeedCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl FeedCache for RecordingFeedCache {
    async fn upsert(&self, post: &PersistedPost) -> Result<(), String> {
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => *existing = post.clone(),
            None => posts.push(post.clone()),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// Collaborator bundle for one pipeline under test.
pub struct TestRig {
    pub storage: Arc<MemoryStorage>,
    pub posts: Arc<MemoryPostStore>,
    pub goals: Arc<RecordingGoalLedger>,
    pub achievements: Option<Arc<RecordingAchievements>>,
    pub notifier: Arc<CollectingNotifier>,
    pub cache: Arc<RecordingFeedCache>,
    pub observer: Arc<CollectingObserver>,
    pub pipeline: SubmitPipeline,
}

impl TestRig {
    pub fn new(
        storage: Arc<MemoryStorage>,
        posts: Arc<MemoryPostStore>,
        goals: Arc<RecordingGoalLedger>,
        achievements: Option<Arc<RecordingAchievements>>,
        config: SubmitConfig,
    ) -> Self {
        let notifier = CollectingNotifier::new();
        let cache = RecordingFeedCache::new();
        let observer = CollectingObserver::new();
        let pipeline = SubmitPipeline::new(
            storage.clone(),
            posts.clone(),
            goals.clone(),
            achievements
                .clone()
                .map(|a| a as Arc<dyn AchievementSink>),
            notifier.clone(),
            cache.clone(),
            config,
        );
        Self {
            storage,
            posts,
            goals,
            achievements,
            notifier,
            cache,
            observer,
            pipeline,
        }
    }

    pub fn simple(config: SubmitConfig) -> Self {
        Self::new(
            MemoryStorage::new(),
            MemoryPostStore::new(),
            RecordingGoalLedger::new(),
            None,
            config,
        )
    }
}
