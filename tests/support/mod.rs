//! Shared test doubles for the provider seams

#![allow(dead_code)]

use async_trait::async_trait;
use scenesynth_gateway::backend::{
    GenerateContentRequest, GenerateContentResponse, GenerativeBackend, SpeechSynthesizer,
};
use scenesynth_gateway::config::Settings;
use scenesynth_gateway::{AppError, AppState, Result};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Reply = Box<dyn Fn(&str) -> Result<GenerateContentResponse> + Send + Sync>;

/// Generative backend that answers from a closure and records every call
pub struct ScriptedBackend {
    reply: Reply,
    delay: Duration,
    pub calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedBackend {
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&str) -> Result<GenerateContentResponse> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text_reply(&text)))
    }

    pub fn inline(mime_type: &str, data: &str) -> Self {
        let (mime_type, data) = (mime_type.to_string(), data.to_string());
        Self::new(move |_| Ok(inline_reply(&mime_type, &data)))
    }

    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| Err(AppError::Provider(message.clone())))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn last_call(&self) -> Option<(String, Value)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_content(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let body = serde_json::to_value(&request)?;
        self.calls.lock().unwrap().push((model.to_string(), body));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)(model)
    }
}

pub fn text_reply(text: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
    .unwrap()
}

pub fn inline_reply(mime_type: &str, data: &str) -> GenerateContentResponse {
    serde_json::from_value(json!({
        "candidates": [{"content": {"parts": [{"inlineData": {"mimeType": mime_type, "data": data}}]}}]
    }))
    .unwrap()
}

/// Speech synthesizer that echoes its inputs as the "audio"
#[derive(Default)]
pub struct EchoSpeech {
    pub fail_with: Option<String>,
}

#[async_trait]
impl SpeechSynthesizer for EchoSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        match &self.fail_with {
            Some(message) => Err(AppError::RetriesExhausted {
                operation: "Voice generation".to_string(),
                attempts: 3,
                last_error: message.clone(),
            }),
            None => Ok(format!("{}|{}", voice, text).into_bytes()),
        }
    }
}

/// Settings that never pick up real provider credentials
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.gemini.api_key_env = "SCENESYNTH_TEST_UNSET_GEMINI".to_string();
    settings.freesound.api_key_env = "SCENESYNTH_TEST_UNSET_FREESOUND".to_string();
    settings.inference.api_key_env = "SCENESYNTH_TEST_UNSET_HF".to_string();
    settings
}

pub fn test_state(
    settings: Settings,
    generative: Arc<dyn GenerativeBackend>,
    speech: Arc<dyn SpeechSynthesizer>,
) -> Arc<AppState> {
    Arc::new(AppState::new(settings, generative, speech).unwrap())
}
