//! Google Gemini configuration

use crate::errors::{PetError, Result};
use std::env;

/// Gemini models the pet knows how to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash preview - short conversational replies
    Gemini25FlashPreview,
    /// Gemini 2.5 Flash - stable text model
    Gemini25Flash,
    /// Gemini 2.5 Flash TTS preview - speech synthesis
    Gemini25FlashTts,
    /// Gemini 2.5 Pro TTS preview - higher quality speech synthesis
    Gemini25ProTts,
}

impl GeminiModel {
    /// Get the model name for API requests
    pub fn model_name(&self) -> &'static str {
        match self {
            GeminiModel::Gemini25FlashPreview => "gemini-2.5-flash-preview-09-2025",
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini25FlashTts => "gemini-2.5-flash-preview-tts",
            GeminiModel::Gemini25ProTts => "gemini-2.5-pro-preview-tts",
        }
    }

    /// Whether the model produces audio rather than text
    pub fn is_speech(&self) -> bool {
        matches!(
            self,
            GeminiModel::Gemini25FlashTts | GeminiModel::Gemini25ProTts
        )
    }

    /// Get the full endpoint path for the model
    pub fn endpoint(&self) -> String {
        format!("models/{}:generateContent", self.model_name())
    }

    /// Parse model string to GeminiModel enum
    pub fn parse(model_str: &str) -> Result<Self> {
        match model_str {
            "gemini-2.5-flash-preview-09-2025" => Ok(GeminiModel::Gemini25FlashPreview),
            "gemini-2.5-flash" => Ok(GeminiModel::Gemini25Flash),
            "gemini-2.5-flash-preview-tts" => Ok(GeminiModel::Gemini25FlashTts),
            "gemini-2.5-pro-preview-tts" => Ok(GeminiModel::Gemini25ProTts),
            _ => Err(PetError::configuration(format!(
                "Unknown Gemini model: {model_str}"
            ))),
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for Google AI; empty means no credential
    pub api_key: String,
    /// Model that writes the pet's reply
    pub reply_model: GeminiModel,
    /// Model that speaks the reply
    pub speech_model: GeminiModel,
    /// Prebuilt voice used for speech synthesis
    pub voice_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// API root; the key travels in a header, never in this URL
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            reply_model: GeminiModel::Gemini25FlashPreview,
            speech_model: GeminiModel::Gemini25FlashTts,
            voice_name: "Kore".to_string(),
            timeout_seconds: 30,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    /// Override fields with whatever the environment provides.
    ///
    /// A missing `GEMINI_API_KEY` is not an error: the pet simply stays quiet.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            self.api_key = api_key.trim().to_string();
        }

        if let Ok(model) = env::var("GEMINI_MODEL") {
            self.reply_model = GeminiModel::parse(&model)?;
        }

        if let Ok(model) = env::var("GEMINI_TTS_MODEL") {
            self.speech_model = GeminiModel::parse(&model)?;
        }

        if let Ok(voice) = env::var("GEMINI_VOICE") {
            self.voice_name = voice;
        }

        if let Ok(timeout) = env::var("GEMINI_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse().map_err(|_| {
                PetError::configuration("Invalid GEMINI_TIMEOUT_SECONDS")
            })?;
        }

        Ok(())
    }

    /// Whether a credential was supplied
    pub fn has_credential(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.has_credential() && !self.api_key.starts_with("AIza") {
            return Err(PetError::configuration(
                "Invalid Gemini API key format (should start with 'AIza')",
            ));
        }

        if self.reply_model.is_speech() {
            return Err(PetError::configuration(format!(
                "{} cannot write text replies",
                self.reply_model
            )));
        }

        if !self.speech_model.is_speech() {
            return Err(PetError::configuration(format!(
                "{} cannot synthesize speech",
                self.speech_model
            )));
        }

        if self.voice_name.trim().is_empty() {
            return Err(PetError::configuration("Voice name cannot be empty"));
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(PetError::configuration(
                "Timeout must be between 1 and 300 seconds",
            ));
        }

        Ok(())
    }

    /// Get the full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }
}
