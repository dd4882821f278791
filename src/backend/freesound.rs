//! Freesound APIv2 text search

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use utoipa::ToSchema;

use crate::config::FreesoundConfig;
use crate::error::{AppError, Result};

const SEARCH_FIELDS: &str = "id,name,duration,previews,username,license";
const PREVIEW_PREFERENCE: [&str; 2] = ["preview-hq-mp3", "preview-lq-mp3"];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    results: Vec<RawSound>,
}

#[derive(Debug, Deserialize)]
struct RawSound {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    previews: HashMap<String, String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    license: Option<String>,
}

/// Search hit reshaped for clients
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SoundHit {
    pub id: u64,
    pub name: String,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl From<RawSound> for SoundHit {
    fn from(raw: RawSound) -> Self {
        let preview_url = PREVIEW_PREFERENCE
            .iter()
            .find_map(|key| raw.previews.get(*key).cloned());

        Self {
            id: raw.id,
            name: raw.name,
            duration: raw.duration,
            preview_url,
            username: raw.username,
            license: raw.license,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SoundSearchPage {
    pub count: u64,
    pub results: Vec<SoundHit>,
}

pub struct FreesoundBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
}

impl FreesoundBackend {
    pub fn new(config: &FreesoundConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
            page_size: config.page_size,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Text search; `limit` falls back to the configured page size
    pub async fn search(&self, query: &str, limit: Option<u32>) -> Result<SoundSearchPage> {
        let token = self.api_key.as_deref().ok_or_else(|| {
            AppError::ProviderUnavailable("Sound search is not configured".to_string())
        })?;

        let page_size = limit.unwrap_or(self.page_size).clamp(1, 150).to_string();
        let url = format!("{}/search/text/", self.base_url);
        debug!(query = %query, page_size = %page_size, "Searching sounds");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("fields", SEARCH_FIELDS),
                ("page_size", page_size.as_str()),
                ("token", token),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Freesound returned {}: {}",
                status, body
            )));
        }

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Freesound response: {}", e)))?;

        Ok(SoundSearchPage {
            count: page.count,
            results: page.results.into_iter().map(SoundHit::from).collect(),
        })
    }
}
