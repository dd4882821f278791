//! edge-tts speech handlers

use crate::api::models::TtsRequest;
use crate::error::{AppError, ErrorResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Synthesize narration and stream it back as MP3
#[utoipa::path(
    post,
    path = "/api/tts",
    request_body = TtsRequest,
    responses(
        (status = 200, description = "MP3 audio (audio/mpeg)"),
        (status = 400, description = "Missing text or unsupported language", body = ErrorResponse),
        (status = 500, description = "Synthesis failed", body = ErrorResponse)
    ),
    tag = "Speech"
)]
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;

    let text = request
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("No text provided".to_string()))?;

    let voice = state
        .settings
        .voices
        .resolve(request.voice.as_deref(), request.lang.as_deref())?;

    info!(voice = %voice, chars = text.chars().count(), "Received TTS request");
    let audio = state.speech.synthesize(text, &voice).await?;

    let filename = format!("{}.mp3", Uuid::new_v4());
    info!(bytes = audio.len(), filename = %filename, "Streaming synthesized audio");

    Ok((
        [
            (CONTENT_TYPE, "audio/mpeg".to_string()),
            (CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", filename)),
        ],
        audio,
    )
        .into_response())
}
