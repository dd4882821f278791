//! Backend module - provider clients and call policies

pub mod edge_tts;
pub mod fetch;
pub mod freesound;
pub mod gemini;
pub mod inference;
pub mod retry;

// Re-export provider seams for convenience
pub use edge_tts::{EdgeTtsBackend, SpeechSynthesizer};
pub use fetch::{FetchedMedia, MediaFetcher};
pub use freesound::{FreesoundBackend, SoundHit, SoundSearchPage};
pub use gemini::{
    GeminiBackend, GenerateContentRequest, GenerateContentResponse, GenerativeBackend,
};
pub use inference::InferenceBackend;
pub use retry::RetryPolicy;
