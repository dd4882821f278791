//! Image, speech, and proxy actions
//!
//! Failures here are reported in the reply body (`success: false`) so the
//! client can switch to its own fallback media; only a missing provider
//! configuration escapes as an error.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::backend::{
    GenerateContentRequest, GenerativeBackend, InferenceBackend, MediaFetcher,
};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::response::{data_url, data_url_from_bytes, encode_base64};

const DEFAULT_AUDIO_MIME: &str = "audio/mp3";

/// Where an image reply came from, or why it is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Gemini,
    GeminiEmpty,
    GeminiError,
    Timeout,
    Error,
    Inference,
    InferenceError,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub success: bool,
    /// `data:` URL of the image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: ImageSource,
    pub use_fallback: bool,
}

impl ImageResult {
    fn image(data: String, source: ImageSource) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source,
            use_fallback: false,
        }
    }

    fn failed(error: impl Into<String>, source: ImageSource) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            source,
            use_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpeechSource {
    Gemini,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResult {
    pub success: bool,
    /// Base64 audio payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: SpeechSource,
}

impl SpeechResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            audio: None,
            mime_type: None,
            error: Some(error.into()),
            source: SpeechSource::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ProxyResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProxyResult {
    fn ok(data: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub struct MediaService {
    backend: Arc<dyn GenerativeBackend>,
    fetcher: MediaFetcher,
    inference: InferenceBackend,
    image_model: String,
    tts_model: String,
    tts_voice: String,
    image_timeout: Duration,
    flux_timeout: Duration,
    sot_timeout: Duration,
}

impl MediaService {
    pub fn new(backend: Arc<dyn GenerativeBackend>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            backend,
            fetcher: MediaFetcher::new(&settings.proxy)?,
            inference: InferenceBackend::new(&settings.inference)?,
            image_model: settings.gemini.image_model.clone(),
            tts_model: settings.gemini.tts_model.clone(),
            tts_voice: settings.gemini.tts_voice.clone(),
            image_timeout: settings.image_timeout(),
            flux_timeout: Duration::from_secs(settings.proxy.flux_timeout_secs),
            sot_timeout: Duration::from_secs(settings.proxy.sot_timeout_secs),
        })
    }

    pub fn inference_configured(&self) -> bool {
        self.inference.is_configured()
    }

    /// Generate a vertical scene image, bounded by the image timeout.
    ///
    /// The provider call runs on its own task so an expired wait can abort it.
    pub async fn scene_image(&self, prompt: &str) -> ImageResult {
        let full_prompt = format!(
            "Generate a high-quality cinematic image: {}. Vertical 9:16 aspect ratio, professional photography, 4k quality.",
            prompt
        );

        let backend = self.backend.clone();
        let model = self.image_model.clone();
        let mut task = tokio::spawn(async move { generate_image(backend, model, full_prompt).await });

        match tokio::time::timeout(self.image_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                error!(error = %join_error, "Image generation task failed");
                ImageResult::failed(join_error.to_string(), ImageSource::Error)
            }
            Err(_) => {
                task.abort();
                let err = AppError::Timeout(self.image_timeout.as_secs());
                warn!(timeout_secs = self.image_timeout.as_secs(), "Image generation timed out");
                ImageResult::failed(err.to_string(), ImageSource::Timeout)
            }
        }
    }

    /// Speech from the Gemini TTS model with a prebuilt voice
    pub async fn gemini_speech(&self, text: &str) -> SpeechResult {
        if text.trim().is_empty() {
            return SpeechResult::failed("No text provided");
        }

        let request = GenerateContentRequest::prompt(text)
            .with_modalities(&["AUDIO"])
            .with_voice(self.tts_voice.clone());

        info!(model = %self.tts_model, "Generating speech");
        match self.backend.generate_content(&self.tts_model, request).await {
            Ok(response) => match response.inline_data() {
                Some(inline) => {
                    let mime_type = if inline.mime_type.is_empty() {
                        DEFAULT_AUDIO_MIME.to_string()
                    } else {
                        inline.mime_type.clone()
                    };
                    info!(mime_type = %mime_type, encoded_len = inline.data.len(), "Gemini generated audio");
                    SpeechResult {
                        success: true,
                        audio: Some(inline.data.clone()),
                        mime_type: Some(mime_type),
                        error: None,
                        source: SpeechSource::Gemini,
                    }
                }
                None => {
                    warn!("No audio part in Gemini response");
                    SpeechResult::failed("No audio data returned")
                }
            },
            Err(e) => {
                error!(error = %e, "Gemini speech generation failed");
                SpeechResult::failed(e.to_string())
            }
        }
    }

    /// Fetch a remote image and return it as a `data:` URL
    pub async fn proxy_flux(&self, url: &str) -> ProxyResult {
        info!(url = %truncate(url, 80), "Proxying image");
        match self.fetcher.fetch(url, self.flux_timeout).await {
            Ok(media) => {
                info!(bytes = media.bytes.len(), mime_type = %media.mime_type, "Proxied image");
                ProxyResult::ok(data_url_from_bytes(&media.mime_type, &media.bytes))
            }
            Err(e) => {
                warn!(error = %e, "Image proxy failed");
                ProxyResult::failed(e.to_string())
            }
        }
    }

    /// Fetch a remote asset and return the raw base64 body
    pub async fn proxy_sot(&self, url: &str) -> ProxyResult {
        match self.fetcher.fetch(url, self.sot_timeout).await {
            Ok(media) => ProxyResult::ok(encode_base64(&media.bytes)),
            Err(e) => {
                warn!(error = %e, "Asset proxy failed");
                ProxyResult::failed(e.to_string())
            }
        }
    }

    /// Text-to-image through the inference provider
    pub async fn infer_image(&self, prompt: &str, model: Option<&str>) -> Result<ImageResult> {
        match self.inference.text_to_image(prompt, model).await {
            Ok(media) => Ok(ImageResult::image(
                data_url_from_bytes(&media.mime_type, &media.bytes),
                ImageSource::Inference,
            )),
            Err(e @ AppError::ProviderUnavailable(_)) => Err(e),
            Err(e) => {
                warn!(error = %e, model = %model.unwrap_or(self.inference.default_model()), "Image inference failed");
                Ok(ImageResult::failed(e.to_string(), ImageSource::InferenceError))
            }
        }
    }
}

async fn generate_image(
    backend: Arc<dyn GenerativeBackend>,
    model: String,
    prompt: String,
) -> ImageResult {
    let request = GenerateContentRequest::prompt(prompt).with_modalities(&["IMAGE"]);

    info!(model = %model, "Generating scene image");
    match backend.generate_content(&model, request).await {
        Ok(response) => match response.inline_data() {
            Some(inline) => {
                info!(mime_type = %inline.mime_type, encoded_len = inline.data.len(), "Gemini generated image");
                ImageResult::image(data_url(&inline.mime_type, &inline.data), ImageSource::Gemini)
            }
            None => {
                warn!("No image data in Gemini response");
                ImageResult::failed("No image data in Gemini response", ImageSource::GeminiEmpty)
            }
        },
        Err(e) => {
            error!(error = %e, "Gemini image generation failed");
            ImageResult::failed(format!("Gemini error: {}", e), ImageSource::GeminiError)
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
