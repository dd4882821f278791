//! edge-tts speech synthesis through the command line tool

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::retry::RetryPolicy;
use crate::config::EdgeTtsConfig;
use crate::error::{AppError, Result};

/// Trait for text-to-speech engines returning encoded audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice`, returning MP3 bytes
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

/// Runs `edge-tts --text .. --voice .. --write-media ..` with bounded retries
pub struct EdgeTtsBackend {
    command: String,
    args: Vec<String>,
    attempt_timeout: Duration,
    retry: RetryPolicy,
}

impl EdgeTtsBackend {
    pub fn new(config: &EdgeTtsConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
            retry: RetryPolicy::new(
                config.max_attempts,
                Duration::from_millis(config.retry_backoff_ms),
            ),
        }
    }

    async fn run_once(&self, text: &str, voice: &str, output: &Path) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .arg("--text")
            .arg(text)
            .arg("--voice")
            .arg(voice)
            .arg("--write-media")
            .arg(output)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.attempt_timeout, command.output())
            .await
            .map_err(|_| AppError::Provider("Timeout".to_string()))?;

        let process = result.map_err(|e| {
            AppError::Provider(format!("Failed to run {}: {}", self.command, e))
        })?;

        if !process.status.success() {
            let stderr = String::from_utf8_lossy(&process.stderr);
            let message = if stderr.trim().is_empty() {
                format!("{} exited with {}", self.command, process.status)
            } else {
                stderr.trim().to_string()
            };
            return Err(AppError::Provider(message));
        }

        match tokio::fs::read(output).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(AppError::Provider("File was not created or empty".to_string())),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsBackend {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        // Removed on drop, whichever way we leave this function.
        let workdir = tempfile::Builder::new().prefix("scenesynth-tts").tempdir()?;
        let output = workdir.path().join(format!("{}.mp3", Uuid::new_v4()));

        debug!(voice = %voice, path = %output.display(), "Generating voice");

        let audio = self
            .retry
            .run("Voice generation", |attempt| {
                let output = output.clone();
                async move {
                    debug!(attempt, text = %preview(text), "edge-tts attempt");
                    self.run_once(text, voice, &output).await
                }
            })
            .await?;

        info!(voice = %voice, bytes = audio.len(), "edge-tts synthesis succeeded");
        Ok(audio)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(30).collect()
}
