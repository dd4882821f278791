//! Gateway services - request shaping, fallbacks, and timeouts over the backends

pub mod media;
pub mod story;

pub use media::{ImageResult, ImageSource, MediaService, ProxyResult, SpeechResult, SpeechSource};
pub use story::{IntroTitle, OutroMessage, SceneText, StoryPlan, StoryService};
