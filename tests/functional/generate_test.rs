//! `POST /api/generate` action dispatch

use crate::support::{test_settings, test_state, EchoSpeech, ScriptedBackend};
use crate::{body_json, post_json};
use axum::http::StatusCode;
use axum::Router;
use scenesynth_gateway::api::routes::create_router;
use scenesynth_gateway::backend::GenerativeBackend;
use std::sync::Arc;

fn router(backend: ScriptedBackend) -> Router {
    let generative: Arc<dyn GenerativeBackend> = Arc::new(backend);
    create_router(test_state(test_settings(), generative, Arc::new(EchoSpeech::default()))).unwrap()
}

#[tokio::test]
async fn test_story_plan() {
    let plan = r#"{
        "title": "Night Owls",
        "outroMessage": "Follow for more owls",
        "scenes": [
            {"storyLine": "One", "imagePrompt": "owl 1"},
            {"storyLine": "Two", "imagePrompt": "owl 2"},
            {"storyLine": "Three", "imagePrompt": "owl 3"},
            {"storyLine": "Four", "imagePrompt": "owl 4"},
            {"storyLine": "Five", "imagePrompt": "owl 5"}
        ]
    }"#;
    let router = router(ScriptedBackend::text(plan));

    let response = post_json(
        &router,
        "/api/generate",
        r#"{"action":"generateStoryPlan","topic":"owls","style":"documentary"}"#,
    )
    .await;
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Night Owls");
    assert_eq!(body["scenes"].as_array().unwrap().len(), 5);
    assert_eq!(body["scenes"][4]["imagePrompt"], "owl 5");
}

#[tokio::test]
async fn test_story_plan_falls_back_on_provider_error() {
    let router = router(ScriptedBackend::failing("quota"));

    let response = post_json(&router, "/api/generate", r#"{"action":"generateStoryPlan","topic":"owls"}"#).await;
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scenes"].as_array().unwrap().len(), 5);
    assert!(body.get("success").is_none());
}

#[tokio::test]
async fn test_intro_title_and_outro() {
    let router = router(ScriptedBackend::text("  Owls After Dark  "));

    let (_, body) = body_json(
        post_json(&router, "/api/generate", r#"{"action":"generateIntroTitle","topic":"owls"}"#).await,
    )
    .await;
    assert_eq!(body["title"], "Owls After Dark");

    let (_, body) = body_json(
        post_json(&router, "/api/generate", r#"{"action":"generateOutroMessage","topic":"owls"}"#).await,
    )
    .await;
    assert_eq!(body["message"], "Owls After Dark");
}

#[tokio::test]
async fn test_scene_image_failure_is_in_body() {
    let router = router(ScriptedBackend::text("no picture"));

    let response = post_json(
        &router,
        "/api/generate",
        r#"{"action":"generateSceneImage","prompt":"a forest"}"#,
    )
    .await;
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["source"], "gemini_empty");
    assert_eq!(body["useFallback"], true);
}

#[tokio::test]
async fn test_gemini_tts() {
    let router = router(ScriptedBackend::inline("audio/wav", "UklGRg=="));

    let response = post_json(&router, "/api/generate", r#"{"action":"generateGeminiTTS","text":"Hello"}"#).await;
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["audio"], "UklGRg==");
    assert_eq!(body["mimeType"], "audio/wav");
}

#[tokio::test]
async fn test_proxy_rejects_bad_scheme_in_body() {
    let router = router(ScriptedBackend::failing("unused"));

    let response = post_json(
        &router,
        "/api/generate",
        r#"{"action":"proxyFlux","url":"file:///etc/passwd"}"#,
    )
    .await;
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unsupported URL scheme: file");
}

#[tokio::test]
async fn test_unknown_action() {
    let router = router(ScriptedBackend::failing("unused"));

    let (status, body) =
        body_json(post_json(&router, "/api/generate", r#"{"action":"makeCoffee"}"#).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unknown action: makeCoffee");

    let (status, body) = body_json(post_json(&router, "/api/generate", r#"{"topic":"owls"}"#).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown action: ");
}

#[tokio::test]
async fn test_malformed_bodies() {
    let router = router(ScriptedBackend::failing("unused"));

    let (status, body) = body_json(post_json(&router, "/api/generate", "{not json").await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));

    let (status, body) = body_json(post_json(&router, "/api/generate", r#""just a string""#).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_null_and_mistyped_fields_use_defaults() {
    let router = router(ScriptedBackend::text("See you next time"));

    let (status, body) = body_json(
        post_json(
            &router,
            "/api/generate",
            r#"{"action":"generateOutroMessage","topic":"owls","context":null,"style":null,"url":null}"#,
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "See you next time");
}

#[tokio::test]
async fn test_scene_index_accepts_numeric_strings_and_floats() {
    let router = router(ScriptedBackend::failing("offline"));

    for (raw, expected) in [(r#""2""#, "Scene 2 about owls"), ("3.0", "Scene 3 about owls")] {
        let request = format!(
            r#"{{"action":"generateSingleSceneText","topic":"owls","sceneIndex":{},"context":null}}"#,
            raw
        );
        let (status, body) = body_json(post_json(&router, "/api/generate", &request).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storyLine"], expected);
    }
}
