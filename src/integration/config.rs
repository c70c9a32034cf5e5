//! Configuration for the application
//!
//! Loaded from `~/.config/adarchitect/config.toml` when present. Every field
//! has a default, so a partial file only overrides what it names.

use crate::audio::{CAPTURE_WINDOW, INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, VOLUME_SCALE};
use crate::live::transport::LIVE_ENDPOINT;
use crate::studio::client::GEMINI_BASE_URL;
use crate::studio::prompts::live_director_instruction;
use crate::studio::types::{Language, ModelType};
use crate::{AdArchitectError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Top-level configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini API key shared by the live and studio clients
    pub api_key: String,

    pub live: LiveConfig,

    pub studio: StudioConfig,

    /// Whether to enable audio input
    pub enable_audio_input: bool,

    /// Whether to enable audio output
    pub enable_audio_output: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            live: LiveConfig::default(),
            studio: StudioConfig::default(),
            enable_audio_input: true,
            enable_audio_output: true,
        }
    }
}

impl AppConfig {
    /// `<config dir>/adarchitect/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("adarchitect").join("config.toml"))
    }

    /// Load from the default path (if it exists) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| AdArchitectError::ConfigError(format!("Invalid config: {}", e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| AdArchitectError::ConfigError(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {}", API_KEY_ENV);
            self.api_key = key.trim().to_string();
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the output language for both the studio and the live director
    pub fn with_language(mut self, language: Language) -> Self {
        self.live.language = language;
        self.studio.language = language;
        self
    }

    /// Disable audio input
    pub fn without_audio_input(mut self) -> Self {
        self.enable_audio_input = false;
        self
    }

    /// Disable audio output
    pub fn without_audio_output(mut self) -> Self {
        self.enable_audio_output = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.live.validate()?;
        self.studio.validate()
    }
}

/// Live voice session settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub model: String,

    /// Prebuilt voice the model speaks with
    pub voice: String,

    pub language: Language,

    /// Replaces the built-in director instruction when set
    pub system_instruction: Option<String>,

    pub endpoint: String,

    pub input_sample_rate: u32,

    pub output_sample_rate: u32,

    /// Samples per outgoing audio frame
    pub capture_window: usize,

    /// Multiplier from capture RMS to the displayed volume
    pub volume_scale: f32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            model: ModelType::Live.default_id().to_string(),
            voice: "Kore".to_string(),
            language: Language::default(),
            system_instruction: None,
            endpoint: LIVE_ENDPOINT.to_string(),
            input_sample_rate: INPUT_SAMPLE_RATE,
            output_sample_rate: OUTPUT_SAMPLE_RATE,
            capture_window: CAPTURE_WINDOW,
            volume_scale: VOLUME_SCALE,
        }
    }
}

impl LiveConfig {
    pub fn system_instruction(&self) -> String {
        self.system_instruction
            .clone()
            .unwrap_or_else(|| live_director_instruction(self.language))
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(AdArchitectError::ConfigError("Live model is required".to_string()));
        }
        if self.input_sample_rate == 0 || self.output_sample_rate == 0 {
            return Err(AdArchitectError::ConfigError(
                "Live sample rates must be positive".to_string(),
            ));
        }
        if self.capture_window == 0 {
            return Err(AdArchitectError::ConfigError(
                "Capture window must hold at least one sample".to_string(),
            ));
        }
        if !(self.endpoint.starts_with("wss://") || self.endpoint.starts_with("ws://")) {
            return Err(AdArchitectError::ConfigError(format!(
                "Live endpoint must be a WebSocket URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}

/// Text generation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub base_url: String,

    pub flash_model: String,

    pub pro_model: String,

    pub temperature: f32,

    /// Thinking tokens granted to the Pro model
    pub thinking_budget: u32,

    pub language: Language,

    pub request_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            flash_model: ModelType::Flash.default_id().to_string(),
            pro_model: ModelType::Pro.default_id().to_string(),
            temperature: 0.7,
            thinking_budget: 16384,
            language: Language::default(),
            request_timeout_secs: 120,
        }
    }
}

impl StudioConfig {
    pub fn model_id(&self, model: ModelType) -> &str {
        match model {
            ModelType::Flash => &self.flash_model,
            ModelType::Pro => &self.pro_model,
            ModelType::Live => ModelType::Live.default_id(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AdArchitectError::ConfigError(format!(
                "Temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if !self.base_url.starts_with("http") {
            return Err(AdArchitectError::ConfigError(format!(
                "Studio base URL must be HTTP(S): {}",
                self.base_url
            )));
        }
        Ok(())
    }
}
