//! SceneSynth Gateway
//!
//! An HTTP gateway that fronts generative text, image, and speech providers
//! plus sound search and image inference, reshaping every reply into a small
//! JSON contract with timeout, retry, and fallback policies.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod gateway;
pub mod middleware;
pub mod response;

pub use error::{AppError, Result};

use chrono::{DateTime, Utc};
use std::sync::Arc;

use backend::{EdgeTtsBackend, FreesoundBackend, GeminiBackend, GenerativeBackend, SpeechSynthesizer};
use config::Settings;
use gateway::{MediaService, StoryService};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<Settings>,
    pub generative: Arc<dyn GenerativeBackend>,
    pub story: StoryService,
    pub media: MediaService,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub sounds: FreesoundBackend,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire the production providers from configuration
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let generative: Arc<dyn GenerativeBackend> = Arc::new(GeminiBackend::new(&settings.gemini)?);
        let speech: Arc<dyn SpeechSynthesizer> = Arc::new(EdgeTtsBackend::new(&settings.edge_tts));
        Self::new(settings, generative, speech)
    }

    /// Wire the state around the given generative and speech providers
    pub fn new(
        settings: Settings,
        generative: Arc<dyn GenerativeBackend>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Result<Self> {
        let story = StoryService::new(generative.clone(), settings.gemini.text_model.clone());
        let media = MediaService::new(generative.clone(), &settings)?;
        let sounds = FreesoundBackend::new(&settings.freesound)?;

        Ok(Self {
            settings: Arc::new(settings),
            generative,
            story,
            media,
            speech,
            sounds,
            started_at: Utc::now(),
        })
    }
}
