//! Story text actions with canned fallbacks

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::backend::{GenerateContentRequest, GenerativeBackend};
use crate::error::{AppError, Result};

pub const SCENE_COUNT: usize = 5;
pub const DEFAULT_OUTRO: &str = "Thanks for watching!";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SceneText {
    pub story_line: String,
    pub image_prompt: String,
}

impl SceneText {
    fn fallback(topic: &str, scene_index: i64) -> Self {
        Self {
            story_line: format!("Scene {} about {}", scene_index, topic),
            image_prompt: topic.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryPlan {
    pub title: String,
    pub outro_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_image_prompt: Option<String>,
    pub scenes: Vec<SceneText>,
}

impl StoryPlan {
    fn fallback(topic: &str) -> Self {
        Self {
            title: topic.to_string(),
            outro_message: DEFAULT_OUTRO.to_string(),
            intro_image_prompt: Some(topic.to_string()),
            scenes: (1..=SCENE_COUNT as i64)
                .map(|i| SceneText::fallback(topic, i))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct IntroTitle {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct OutroMessage {
    pub message: String,
}

fn scene_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "storyLine": {"type": "STRING"},
            "imagePrompt": {"type": "STRING"}
        },
        "required": ["storyLine", "imagePrompt"]
    })
}

fn story_plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "outroMessage": {"type": "STRING"},
            "introImagePrompt": {"type": "STRING"},
            "scenes": {"type": "ARRAY", "items": scene_schema()}
        },
        "required": ["title", "outroMessage", "scenes"]
    })
}

/// Story planning over a text model. None of these calls fail.
pub struct StoryService {
    backend: Arc<dyn GenerativeBackend>,
    model: String,
}

impl StoryService {
    pub fn new(backend: Arc<dyn GenerativeBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub async fn story_plan(&self, topic: &str, style: &str) -> StoryPlan {
        let prompt = format!(
            "Create a {}-scene YouTube Short plan. Topic: {}. Style: {}. Return JSON.",
            SCENE_COUNT, topic, style
        );

        self.generate_json(prompt, story_plan_schema())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Story plan generation failed, using fallback");
                StoryPlan::fallback(topic)
            })
    }

    pub async fn scene_text(&self, topic: &str, scene_index: i64, context: &str) -> SceneText {
        let prompt = format!(
            "Write Scene {} for a video about {}. Context: {}. Return JSON.",
            scene_index, topic, context
        );

        self.generate_json(prompt, scene_schema())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, scene_index, "Scene text generation failed, using fallback");
                SceneText::fallback(topic, scene_index)
            })
    }

    /// `style` is accepted for parity with the plan call; the title prompt ignores it.
    pub async fn intro_title(&self, topic: &str, _style: &str) -> IntroTitle {
        let prompt = format!("One short catchy title for a video about {}. Text only.", topic);
        let title = self
            .generate_text(prompt)
            .await
            .unwrap_or_else(|| topic.to_string());
        IntroTitle { title }
    }

    pub async fn outro_message(&self, topic: &str) -> OutroMessage {
        let prompt = format!("One short outro CTA for {}. Text only.", topic);
        let message = self
            .generate_text(prompt)
            .await
            .unwrap_or_else(|| DEFAULT_OUTRO.to_string());
        OutroMessage { message }
    }

    async fn generate_json<T: DeserializeOwned>(&self, prompt: String, schema: Value) -> Result<T> {
        let request = GenerateContentRequest::prompt(prompt).with_json_schema(schema);
        let response = self.backend.generate_content(&self.model, request).await?;
        let text = response
            .text()
            .ok_or_else(|| AppError::Provider("Empty structured response".to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Trimmed text reply, `None` on error or blank output
    async fn generate_text(&self, prompt: String) -> Option<String> {
        let request = GenerateContentRequest::prompt(prompt);
        match self.backend.generate_content(&self.model, request).await {
            Ok(response) => response
                .text()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            Err(e) => {
                debug!(error = %e, backend = %self.backend.name(), "Text generation failed");
                None
            }
        }
    }
}
