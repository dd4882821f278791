//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub edge_tts: EdgeTtsConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub freesound: FreesoundConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub voices: VoiceCatalog,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5328
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// CORS configuration. An empty origin list allows any origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![],
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rps() -> u32 {
    10
}

fn default_burst() -> u32 {
    20
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Gemini provider configuration (text, image, and speech models)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Upper bound for a single scene image generation
    #[serde(default = "default_image_timeout")]
    pub image_timeout_secs: u64,
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_key_env() -> String {
    "API_KEY".to_string()
}

fn default_text_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_tts_voice() -> String {
    "Kore".to_string()
}

fn default_timeout_ms() -> u64 {
    60000
}

fn default_image_timeout() -> u64 {
    45
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            api_key: None,
            api_key_env: default_gemini_key_env(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            timeout_ms: default_timeout_ms(),
            image_timeout_secs: default_image_timeout(),
        }
    }
}

impl GeminiConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// edge-tts command line configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeTtsConfig {
    #[serde(default = "default_edge_command")]
    pub command: String,
    /// Arguments placed before the synthesis flags, e.g. `["-m", "edge_tts"]`
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_edge_command() -> String {
    "edge-tts".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_attempt_timeout() -> u64 {
    30000
}

fn default_retry_backoff() -> u64 {
    500
}

impl Default for EdgeTtsConfig {
    fn default() -> Self {
        Self {
            command: default_edge_command(),
            args: vec![],
            max_attempts: default_max_attempts(),
            attempt_timeout_ms: default_attempt_timeout(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

/// Remote media proxy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_flux_timeout")]
    pub flux_timeout_secs: u64,
    #[serde(default = "default_sot_timeout")]
    pub sot_timeout_secs: u64,
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_flux_timeout() -> u64 {
    30
}

fn default_sot_timeout() -> u64 {
    60
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            flux_timeout_secs: default_flux_timeout(),
            sot_timeout_secs: default_sot_timeout(),
        }
    }
}

/// Freesound sound search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FreesoundConfig {
    #[serde(default = "default_freesound_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_freesound_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_freesound_base_url() -> String {
    "https://freesound.org/apiv2".to_string()
}

fn default_freesound_key_env() -> String {
    "FREESOUND_API_KEY".to_string()
}

fn default_page_size() -> u32 {
    10
}

impl Default for FreesoundConfig {
    fn default() -> Self {
        Self {
            base_url: default_freesound_base_url(),
            api_key: None,
            api_key_env: default_freesound_key_env(),
            page_size: default_page_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl FreesoundConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Hugging Face image inference configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,
    #[serde(default = "default_inference_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_inference_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_inference_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_inference_model() -> String {
    "black-forest-labs/FLUX.1-schnell".to_string()
}

fn default_inference_key_env() -> String {
    "HF_TOKEN".to_string()
}

fn default_inference_timeout() -> u64 {
    60
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_base_url(),
            model: default_inference_model(),
            api_key: None,
            api_key_env: default_inference_key_env(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

impl InferenceConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_secret(self.api_key.as_deref(), &self.api_key_env)
    }
}

/// Voice catalog for the edge-tts engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceCatalog {
    #[serde(default = "default_voice")]
    pub default_voice: String,
    /// Language code to voice name
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, String>,
}

fn default_voice() -> String {
    "en-US-ChristopherNeural".to_string()
}

fn default_languages() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("en".to_string(), "en-US-GuyNeural".to_string()),
        ("my".to_string(), "my-MM-ThihaNeural".to_string()),
    ])
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            languages: default_languages(),
        }
    }
}

impl VoiceCatalog {
    /// Pick a voice: an explicit voice wins, then the language mapping, then the default.
    pub fn resolve(&self, voice: Option<&str>, lang: Option<&str>) -> Result<String> {
        if let Some(voice) = voice.map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(voice.to_string());
        }

        match lang.map(str::trim).filter(|l| !l.is_empty()) {
            Some(lang) => self
                .languages
                .get(lang)
                .cloned()
                .ok_or_else(|| AppError::InvalidRequest(format!("Unsupported language: {}", lang))),
            None => Ok(self.default_voice.clone()),
        }
    }
}

fn resolve_secret(explicit: Option<&str>, env_name: &str) -> Option<String> {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(env_name).ok())
        .filter(|key| !key.trim().is_empty())
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_paths("config/gateway.yaml", Some("config/voices.yaml"))
    }

    /// Load settings from a gateway file plus an optional voice catalog file
    pub fn load_from_paths<P: AsRef<Path>>(
        gateway_config: P,
        voices_config: Option<P>,
    ) -> Result<Self> {
        let gateway_path = gateway_config.as_ref();

        let format = if gateway_path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.request_timeout_secs", default_request_timeout() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?;

        if gateway_path.exists() {
            config_builder = config_builder.add_source(File::from(gateway_path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("SCENESYNTH")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;

        if let Some(voices_path) = voices_config {
            let voices_path = voices_path.as_ref();
            if voices_path.exists() {
                settings.voices = Self::load_voices_config(voices_path)?;
            }
        }

        Ok(settings)
    }

    /// Load the voice catalog from a YAML file
    pub fn load_voices_config<P: AsRef<Path>>(path: P) -> Result<VoiceCatalog> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Failed to read voices config: {}",
                e
            )))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Failed to parse voices config: {}",
                e
            )))
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        if self.edge_tts.max_attempts == 0 {
            return Err(invalid("edge_tts.max_attempts must be at least 1"));
        }

        if self.gemini.image_timeout_secs == 0 {
            return Err(invalid("gemini.image_timeout_secs must be greater than 0"));
        }

        if self.rate_limit.enabled
            && (self.rate_limit.requests_per_second == 0 || self.rate_limit.burst_size == 0)
        {
            return Err(invalid(
                "rate_limit.requests_per_second and burst_size must be greater than 0",
            ));
        }

        if self.voices.default_voice.trim().is_empty() {
            return Err(invalid("voices.default_voice cannot be empty"));
        }

        Ok(())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.image_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}
