//! API request and response models

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::backend::SoundHit;
use crate::error::AppError;
use crate::gateway::{
    ImageResult, IntroTitle, OutroMessage, ProxyResult, SceneText, SpeechResult, StoryPlan,
};

/// Body of `POST /api/generate`. Every field is optional; unused fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    /// Action name, e.g. `generateStoryPlan`
    #[serde(deserialize_with = "lenient_action")]
    pub action: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(deserialize_with = "lenient_string")]
    pub style: String,
    /// Image prompt for `generateSceneImage`
    #[serde(deserialize_with = "lenient_string")]
    pub prompt: String,
    /// Integer, float, or numeric string; anything else is 0
    #[serde(deserialize_with = "lenient_index")]
    pub scene_index: i64,
    #[serde(deserialize_with = "lenient_string")]
    pub context: String,
    /// Text for `generateGeminiTTS`
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    /// Remote URL for the proxy actions
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
}

// Null or mistyped values decode to the field default.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_action<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    lenient_string(deserializer).map(|s| Some(s).filter(|s| !s.is_empty()))
}

fn lenient_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let truncate = |f: f64| Some(f).filter(|f| f.is_finite()).map(|f| f as i64);
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
    .unwrap_or_default())
}

/// Actions accepted by `POST /api/generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateAction {
    StoryPlan,
    SceneImage,
    SingleSceneText,
    IntroTitle,
    OutroMessage,
    GeminiTts,
    ProxyFlux,
    ProxySot,
}

impl GenerateAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerateAction::StoryPlan => "generateStoryPlan",
            GenerateAction::SceneImage => "generateSceneImage",
            GenerateAction::SingleSceneText => "generateSingleSceneText",
            GenerateAction::IntroTitle => "generateIntroTitle",
            GenerateAction::OutroMessage => "generateOutroMessage",
            GenerateAction::GeminiTts => "generateGeminiTTS",
            GenerateAction::ProxyFlux => "proxyFlux",
            GenerateAction::ProxySot => "proxySoT",
        }
    }
}

impl FromStr for GenerateAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generateStoryPlan" => Ok(GenerateAction::StoryPlan),
            "generateSceneImage" => Ok(GenerateAction::SceneImage),
            "generateSingleSceneText" => Ok(GenerateAction::SingleSceneText),
            "generateIntroTitle" => Ok(GenerateAction::IntroTitle),
            "generateOutroMessage" => Ok(GenerateAction::OutroMessage),
            "generateGeminiTTS" => Ok(GenerateAction::GeminiTts),
            "proxyFlux" => Ok(GenerateAction::ProxyFlux),
            "proxySoT" => Ok(GenerateAction::ProxySot),
            other => Err(AppError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for GenerateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply of `POST /api/generate`; the shape depends on the action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenerateOutcome {
    StoryPlan(StoryPlan),
    SceneText(SceneText),
    IntroTitle(IntroTitle),
    OutroMessage(OutroMessage),
    Image(ImageResult),
    Speech(SpeechResult),
    Proxy(ProxyResult),
}

impl GenerateOutcome {
    /// The `success` flag, for actions whose reply carries one
    pub fn success(&self) -> Option<bool> {
        match self {
            GenerateOutcome::Image(r) => Some(r.success),
            GenerateOutcome::Speech(r) => Some(r.success),
            GenerateOutcome::Proxy(r) => Some(r.success),
            _ => None,
        }
    }
}

/// Body of `POST /api/tts` and `POST /tts`
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct TtsRequest {
    pub text: Option<String>,
    /// Explicit edge-tts voice name
    #[serde(default)]
    pub voice: Option<String>,
    /// Language code resolved through the voice catalog
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SoundSearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SoundSearchResponse {
    pub success: bool,
    pub count: u64,
    pub results: Vec<SoundHit>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InferImageRequest {
    #[serde(default)]
    pub prompt: String,
    /// Model id override
    #[serde(default)]
    pub model: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub started_at: String,
    pub providers: ProviderSummary,
}

/// Which providers have credentials configured
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ProviderSummary {
    pub gemini: bool,
    pub freesound: bool,
    pub inference: bool,
}
