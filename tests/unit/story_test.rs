//! Story service behaviour over a scripted text model

use crate::support::ScriptedBackend;
use scenesynth_gateway::gateway::story::{StoryService, DEFAULT_OUTRO, SCENE_COUNT};
use std::sync::Arc;

const MODEL: &str = "gemini-1.5-flash";

fn service(backend: Arc<ScriptedBackend>) -> StoryService {
    StoryService::new(backend, MODEL)
}

#[tokio::test]
async fn test_story_plan_from_model() {
    let backend = Arc::new(ScriptedBackend::text(
        r#"{"title":"Deep Sea","outroMessage":"Subscribe!","introImagePrompt":"abyss",
            "scenes":[{"storyLine":"Dive","imagePrompt":"submarine"}]}"#,
    ));
    let plan = service(backend.clone()).story_plan("ocean", "documentary").await;

    assert_eq!(plan.title, "Deep Sea");
    assert_eq!(plan.outro_message, "Subscribe!");
    assert_eq!(plan.intro_image_prompt.as_deref(), Some("abyss"));
    assert_eq!(plan.scenes[0].image_prompt, "submarine");

    let (model, request) = backend.last_call().unwrap();
    assert_eq!(model, MODEL);
    assert_eq!(
        request["contents"][0]["parts"][0]["text"],
        "Create a 5-scene YouTube Short plan. Topic: ocean. Style: documentary. Return JSON."
    );
    assert_eq!(request["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(
        request["generationConfig"]["responseSchema"]["required"],
        serde_json::json!(["title", "outroMessage", "scenes"])
    );
}

#[tokio::test]
async fn test_story_plan_fallback_on_error() {
    let backend = Arc::new(ScriptedBackend::failing("quota exceeded"));
    let plan = service(backend).story_plan("cats", "funny").await;

    assert_eq!(plan.title, "cats");
    assert_eq!(plan.outro_message, DEFAULT_OUTRO);
    assert_eq!(plan.intro_image_prompt.as_deref(), Some("cats"));
    assert_eq!(plan.scenes.len(), SCENE_COUNT);
    assert_eq!(plan.scenes[2].story_line, "Scene 3 about cats");
    assert!(plan.scenes.iter().all(|s| s.image_prompt == "cats"));
}

#[tokio::test]
async fn test_story_plan_fallback_on_malformed_json() {
    let backend = Arc::new(ScriptedBackend::text("not json at all"));
    let plan = service(backend).story_plan("cats", "funny").await;
    assert_eq!(plan.title, "cats");
}

#[tokio::test]
async fn test_scene_text() {
    let backend = Arc::new(ScriptedBackend::text(
        r#"{"storyLine":"The owl wakes","imagePrompt":"owl at dusk"}"#,
    ));
    let scene = service(backend.clone()).scene_text("owls", 2, "night").await;

    assert_eq!(scene.story_line, "The owl wakes");
    let (_, request) = backend.last_call().unwrap();
    assert_eq!(
        request["contents"][0]["parts"][0]["text"],
        "Write Scene 2 for a video about owls. Context: night. Return JSON."
    );
}

#[tokio::test]
async fn test_scene_text_fallback() {
    let backend = Arc::new(ScriptedBackend::failing("boom"));
    let scene = service(backend).scene_text("owls", 4, "").await;
    assert_eq!(scene.story_line, "Scene 4 about owls");
    assert_eq!(scene.image_prompt, "owls");
}

#[tokio::test]
async fn test_intro_title_trimmed() {
    let backend = Arc::new(ScriptedBackend::text("  Night Hunters \n"));
    let title = service(backend.clone()).intro_title("owls", "moody").await;
    assert_eq!(title.title, "Night Hunters");

    let (_, request) = backend.last_call().unwrap();
    assert!(request.get("generationConfig").is_none());
}

#[tokio::test]
async fn test_intro_title_blank_falls_back() {
    let backend = Arc::new(ScriptedBackend::text("   "));
    let title = service(backend).intro_title("owls", "moody").await;
    assert_eq!(title.title, "owls");
}

#[tokio::test]
async fn test_outro_message() {
    let backend = Arc::new(ScriptedBackend::text("Follow for more owls!"));
    assert_eq!(
        service(backend).outro_message("owls").await.message,
        "Follow for more owls!"
    );

    let failing = Arc::new(ScriptedBackend::failing("boom"));
    assert_eq!(service(failing).outro_message("owls").await.message, DEFAULT_OUTRO);
}

#[tokio::test]
async fn test_story_plan_keeps_only_known_fields() {
    let backend = Arc::new(ScriptedBackend::text(
        r#"{"title":"T","outroMessage":"Bye","mood":"calm",
            "scenes":[{"storyLine":"a","imagePrompt":"b","durationSecs":4}]}"#,
    ));
    let plan = service(backend).story_plan("owls", "calm").await;

    let wire = serde_json::to_value(&plan).unwrap();
    assert!(wire.get("mood").is_none());
    assert!(wire["scenes"][0].get("durationSecs").is_none());
    assert_eq!(plan.scenes[0].image_prompt, "b");
}

#[tokio::test]
async fn test_story_plan_with_incomplete_scene_falls_back() {
    let backend = Arc::new(ScriptedBackend::text(
        r#"{"title":"T","outroMessage":"Bye","scenes":[{"storyLine":"no prompt"}]}"#,
    ));
    let plan = service(backend).story_plan("owls", "calm").await;

    assert_eq!(plan.title, "owls");
    assert_eq!(plan.scenes.len(), SCENE_COUNT);
}
