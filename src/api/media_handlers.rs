//! Sound search and image inference handlers

use crate::api::models::{InferImageRequest, SoundSearchRequest, SoundSearchResponse};
use crate::error::{AppError, ErrorResponse};
use crate::gateway::ImageResult;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

/// Search the sound library by free text
#[utoipa::path(
    post,
    path = "/api/sounds/search",
    request_body = SoundSearchRequest,
    responses(
        (status = 200, description = "Matching sounds", body = SoundSearchResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 503, description = "Sound search not configured", body = ErrorResponse)
    ),
    tag = "Media"
)]
pub async fn search_sounds(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SoundSearchRequest>, JsonRejection>,
) -> Result<Json<SoundSearchResponse>, AppError> {
    let Json(request) = payload?;

    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::InvalidRequest("No query provided".to_string()));
    }

    info!(query = %query, limit = ?request.limit, "Received sound search request");
    let page = state.sounds.search(query, request.limit).await?;

    info!(results = page.results.len(), total = page.count, "Sound search completed");
    Ok(Json(SoundSearchResponse {
        success: true,
        count: page.count,
        results: page.results,
    }))
}

/// Render an image through the inference provider
#[utoipa::path(
    post,
    path = "/api/images/infer",
    request_body = InferImageRequest,
    responses(
        (status = 200, description = "Image or in-body failure", body = ImageResult),
        (status = 400, description = "Missing prompt", body = ErrorResponse),
        (status = 503, description = "Image inference not configured", body = ErrorResponse)
    ),
    tag = "Media"
)]
pub async fn infer_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InferImageRequest>, JsonRejection>,
) -> Result<Json<ImageResult>, AppError> {
    let Json(request) = payload?;

    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::InvalidRequest("No prompt provided".to_string()));
    }

    info!(model = ?request.model, "Received image inference request");
    let result = state.media.infer_image(prompt, request.model.as_deref()).await?;

    info!(success = result.success, source = ?result.source, "Image inference completed");
    Ok(Json(result))
}
