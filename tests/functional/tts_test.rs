//! edge-tts narration routes

use crate::support::{test_settings, test_state, EchoSpeech, ScriptedBackend};
use crate::{body_bytes, body_json, post_json};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::Router;
use scenesynth_gateway::api::routes::create_router;
use std::sync::Arc;

fn router(speech: EchoSpeech) -> Router {
    let state = test_state(
        test_settings(),
        Arc::new(ScriptedBackend::failing("unused")),
        Arc::new(speech),
    );
    create_router(state).unwrap()
}

#[tokio::test]
async fn test_returns_mpeg_audio() {
    let router = router(EchoSpeech::default());

    let response = post_json(&router, "/api/tts", r#"{"text":"Hello world","lang":"my"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "audio/mpeg");

    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("inline; filename=\""));
    assert!(disposition.ends_with(".mp3\""));

    let audio = body_bytes(response).await;
    assert_eq!(audio, b"my-MM-ThihaNeural|Hello world".to_vec());
}

#[tokio::test]
async fn test_explicit_voice_and_default() {
    let router = router(EchoSpeech::default());

    let response = post_json(&router, "/tts", r#"{"text":"Hi","voice":"en-GB-SoniaNeural","lang":"my"}"#).await;
    assert_eq!(body_bytes(response).await, b"en-GB-SoniaNeural|Hi".to_vec());

    let response = post_json(&router, "/tts", r#"{"text":"Hi"}"#).await;
    assert_eq!(body_bytes(response).await, b"en-US-ChristopherNeural|Hi".to_vec());
}

#[tokio::test]
async fn test_missing_text() {
    let router = router(EchoSpeech::default());

    for body in [r#"{}"#, r#"{"text":"   "}"#] {
        let (status, json) = body_json(post_json(&router, "/api/tts", body).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No text provided");
    }
}

#[tokio::test]
async fn test_unsupported_language() {
    let router = router(EchoSpeech::default());

    let (status, json) = body_json(post_json(&router, "/api/tts", r#"{"text":"Hi","lang":"tlh"}"#).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unsupported language: tlh");
}

#[tokio::test]
async fn test_synthesis_failure() {
    let router = router(EchoSpeech {
        fail_with: Some("Timeout".to_string()),
    });

    let (status, json) = body_json(post_json(&router, "/api/tts", r#"{"text":"Hi"}"#).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Voice generation failed after 3 attempts. Last error: Timeout"
    );
}
