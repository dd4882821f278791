//! HTTP route definitions

use crate::api::models::*;
use crate::api::{handlers, media_handlers, tts_handlers};
use crate::backend::SoundHit;
use crate::error::{AppError, ErrorResponse, Result};
use crate::gateway::{
    ImageResult, ImageSource, IntroTitle, OutroMessage, ProxyResult, SceneText, SpeechResult,
    SpeechSource, StoryPlan,
};
use crate::middleware::{build_limiter, rate_limit};
use axum::{
    error_handling::HandleErrorLayer,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SceneSynth Gateway API",
        version = "0.1.0",
        description = "Story, image, speech, and sound provider gateway for short-form video scene synthesis.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:5328", description = "Local development server")
    ),
    paths(
        handlers::health_check,
        handlers::generate,
        tts_handlers::synthesize,
        media_handlers::search_sounds,
        media_handlers::infer_image,
    ),
    components(schemas(
        GenerateRequest,
        StoryPlan,
        SceneText,
        IntroTitle,
        OutroMessage,
        ImageResult,
        ImageSource,
        SpeechResult,
        SpeechSource,
        ProxyResult,
        TtsRequest,
        SoundSearchRequest,
        SoundSearchResponse,
        SoundHit,
        InferImageRequest,
        HealthResponse,
        ProviderSummary,
        ErrorResponse,
    )),
    tags(
        (name = "Generate", description = "Story text, scene image, speech, and proxy actions"),
        (name = "Speech", description = "edge-tts narration"),
        (name = "Media", description = "Sound search and image inference"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}

/// Render a request-level timeout as the JSON envelope
fn timeout_error(err: BoxError, timeout_secs: u64) -> AppError {
    if err.is::<Elapsed>() {
        AppError::Timeout(timeout_secs)
    } else {
        AppError::Internal(err.to_string())
    }
}

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Result<Router> {
    let settings = state.settings.clone();
    let timeout_secs = settings.server.request_timeout_secs;

    // Provider-backed routes
    let api_routes = Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/api/tts", post(tts_handlers::synthesize))
        .route("/tts", post(tts_handlers::synthesize))
        .route("/api/sounds/search", post(media_handlers::search_sounds))
        .route("/api/images/infer", post(media_handlers::infer_image));

    let api_routes = if settings.rate_limit.enabled {
        let limiter = build_limiter(&settings.rate_limit)?;
        api_routes.route_layer(middleware::from_fn_with_state(limiter, rate_limit))
    } else {
        api_routes
    };

    let router = Router::new()
        // Health check endpoint (never rate limited)
        .route("/health", get(handlers::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    timeout_error(err, timeout_secs)
                }))
                .timeout(settings.request_timeout()),
        );

    let router = if settings.cors.enabled {
        router.layer(cors_layer(&settings.cors.allowed_origins))
    } else {
        router
    };

    Ok(router.layer(TraceLayer::new_for_http()))
}
