//! Hugging Face Inference API text-to-image backend

use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::backend::fetch::FetchedMedia;
use crate::config::InferenceConfig;
use crate::error::{AppError, Result};
use crate::response::data_url::essence;

pub struct InferenceBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl InferenceBackend {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.model
    }

    /// Render `prompt` with `model` (or the configured one)
    pub async fn text_to_image(&self, prompt: &str, model: Option<&str>) -> Result<FetchedMedia> {
        let token = self.api_key.as_deref().ok_or_else(|| {
            AppError::ProviderUnavailable("Image inference is not configured".to_string())
        })?;

        let model = model.filter(|m| !m.trim().is_empty()).unwrap_or(self.model.as_str());
        let url = format!("{}/models/{}", self.base_url, model);
        debug!(model = %model, "Sending inference request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Inference returned {}: {}",
                status, body
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(essence)
            .unwrap_or_else(|| "image/jpeg".to_string());

        if !mime_type.starts_with("image/") {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Inference returned {} instead of an image: {}",
                mime_type, body
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(AppError::Provider("Inference returned an empty image".to_string()));
        }

        Ok(FetchedMedia { bytes, mime_type })
    }
}
