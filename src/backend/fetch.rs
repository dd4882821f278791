//! Remote media download used by the proxy actions

use reqwest::{header::CONTENT_TYPE, Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::config::ProxyConfig;
use crate::error::{AppError, Result};
use crate::response::data_url::essence;

const DEFAULT_MIME: &str = "application/octet-stream";

/// Downloaded body with its content type
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

pub struct MediaFetcher {
    client: Client,
}

impl MediaFetcher {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// GET `url`, failing on non-2xx replies
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedMedia> {
        let parsed = Url::parse(url)
            .map_err(|e| AppError::InvalidRequest(format!("Invalid URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::InvalidRequest(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(essence)
            .unwrap_or_else(|| DEFAULT_MIME.to_string());

        let bytes = response.bytes().await?.to_vec();
        debug!(bytes = bytes.len(), mime_type = %mime_type, "Downloaded remote media");

        Ok(FetchedMedia { bytes, mime_type })
    }
}
