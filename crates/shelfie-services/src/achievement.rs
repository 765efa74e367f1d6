//! Achievement API client.
//!
//! Reports fulfilled goals to the external tracker and marks the linked
//! account as submitted. These calls sit outside the core commit: the caller
//! decides whether a failure here unwinds the post.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use shelfie_core::models::goal::AchievementPayload;
use shelfie_core::ports::AchievementSink;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const API_KEY_HEADER: &str = "X-Api-Key";

pub struct AchievementClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountSubmission {
    post_id: Uuid,
}

impl AchievementClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
            .build()
            .context("Failed to create HTTP client for the achievement API")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<(), String> {
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{} returned {}: {}", url, status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl AchievementSink for AchievementClient {
    async fn report(&self, payload: &AchievementPayload) -> Result<(), String> {
        let url = format!("{}/achievements", self.base_url);
        tracing::info!(opportunity_id = %payload.opportunity_id, "reporting achievement");
        self.post_json(&url, payload).await
    }

    async fn mark_account_submitted(&self, account_ref: &str, post_id: Uuid) -> Result<(), String> {
        let url = format!("{}/accounts/{}/submission", self.base_url, account_ref);
        self.post_json(&url, &AccountSubmission { post_id }).await
    }
}
