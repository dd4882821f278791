//! HTTP request handlers for health and the generate action dispatch

use crate::api::models::{
    GenerateAction, GenerateOutcome, GenerateRequest, HealthResponse, ProviderSummary,
};
use crate::error::{AppError, ErrorResponse};
use crate::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Gateway is up", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: state.started_at.to_rfc3339(),
        providers: ProviderSummary {
            gemini: state.generative.is_configured(),
            freesound: state.sounds.is_configured(),
            inference: state.media.inference_configured(),
        },
    })
}

/// Dispatch one generation or proxy action
#[utoipa::path(
    post,
    path = "/api/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Action result; the shape depends on the action"),
        (status = 400, description = "Malformed body or unknown action", body = ErrorResponse),
        (status = 500, description = "Unexpected failure", body = ErrorResponse)
    ),
    tag = "Generate"
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GenerateOutcome>, AppError> {
    let Json(body) = payload?;
    if !body.is_object() {
        return Err(AppError::InvalidRequest(
            "Invalid request body: expected a JSON object".to_string(),
        ));
    }

    let keys: Vec<String> = body
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    let request: GenerateRequest = serde_json::from_value(body)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid request body: {}", e)))?;

    info!(action = ?request.action, keys = ?keys, "Received generate request");

    let action: GenerateAction = request.action.as_deref().unwrap_or_default().parse()?;
    let outcome = dispatch(&state, action, &request).await;

    info!(action = %action, success = ?outcome.success(), "Response ready");
    Ok(Json(outcome))
}

async fn dispatch(state: &AppState, action: GenerateAction, request: &GenerateRequest) -> GenerateOutcome {
    match action {
        GenerateAction::StoryPlan => {
            GenerateOutcome::StoryPlan(state.story.story_plan(&request.topic, &request.style).await)
        }
        GenerateAction::SceneImage => {
            GenerateOutcome::Image(state.media.scene_image(&request.prompt).await)
        }
        GenerateAction::SingleSceneText => GenerateOutcome::SceneText(
            state
                .story
                .scene_text(&request.topic, request.scene_index, &request.context)
                .await,
        ),
        GenerateAction::IntroTitle => GenerateOutcome::IntroTitle(
            state.story.intro_title(&request.topic, &request.style).await,
        ),
        GenerateAction::OutroMessage => {
            GenerateOutcome::OutroMessage(state.story.outro_message(&request.topic).await)
        }
        GenerateAction::GeminiTts => {
            GenerateOutcome::Speech(state.media.gemini_speech(&request.text).await)
        }
        GenerateAction::ProxyFlux => GenerateOutcome::Proxy(state.media.proxy_flux(&request.url).await),
        GenerateAction::ProxySot => GenerateOutcome::Proxy(state.media.proxy_sot(&request.url).await),
    }
}
