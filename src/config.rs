//! Pet configuration
//!
//! Read from `config.toml` in the platform config directory (or an explicit
//! path), every field optional. Gemini credentials come from the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{PetError, Result};
use crate::gemini::{GeminiConfig, GeminiModel};
use crate::pet::audio::SPEECH_SAMPLE_RATE;

const DEFAULT_INSTRUCTION: &str = r#"Age como um pet virtual. Responde curto e fofo. Retorna APENAS JSON: {"text": "frase", "mood": "happy|sad|angry|surprised"}. Contexto: "#;
const DEFAULT_SPEECH_PREFIX: &str = "Diz com fofura: ";
const DEFAULT_PETTING_PROMPT: &str =
    "Estão a fazer-te festinhas na cabeça e tu estás a adorar! Reage com carinho.";
const DEFAULT_EYE_POKE_PROMPT: &str =
    "Estão a carregar nos teus olhos e tu odeias isso! Reage zangado.";

/// What the pet is told before every turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    /// Persona instruction; the user's words are appended to it
    pub instruction: String,
    /// Prepended to the reply before it is sent for speech synthesis
    pub speech_prefix: String,
    /// Synthetic prompt used when petting crosses the threshold
    pub petting_prompt: String,
    /// Synthetic prompt used when an eye is held shut
    pub eye_poke_prompt: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            speech_prefix: DEFAULT_SPEECH_PREFIX.to_string(),
            petting_prompt: DEFAULT_PETTING_PROMPT.to_string(),
            eye_poke_prompt: DEFAULT_EYE_POKE_PROMPT.to_string(),
        }
    }
}

/// Petting and eye-poking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Capability flag; off gives the plain talk-only pet
    pub enabled: bool,
    /// Petting strokes needed before the pet reacts (fires once exceeded)
    pub petting_threshold: u32,
    /// How long an eye must stay held shut before the pet reacts
    pub eye_hold_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            petting_threshold: 40,
            eye_hold_ms: 1500,
        }
    }
}

impl GestureConfig {
    pub fn eye_hold(&self) -> Duration {
        Duration::from_millis(self.eye_hold_ms)
    }
}

/// Optional `[gemini]` section; the API key is never read from disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub model: Option<String>,
    pub tts_model: Option<String>,
    pub voice: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Full pet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    pub persona: PersonaConfig,
    pub gestures: GestureConfig,
    pub gemini: GeminiSection,
    /// Speech recognition locale handed to the transcript collaborator
    pub locale: String,
    /// Delay before the face returns to neutral
    pub mood_decay_ms: u64,
    /// Sample rate of the synthesized speech
    pub sample_rate: u32,
    /// Mouth open/close period while speaking
    pub mouth_interval_ms: u64,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            persona: PersonaConfig::default(),
            gestures: GestureConfig::default(),
            gemini: GeminiSection::default(),
            locale: "pt-PT".to_string(),
            mood_decay_ms: 5000,
            sample_rate: SPEECH_SAMPLE_RATE,
            mouth_interval_ms: 150,
        }
    }
}

impl PetConfig {
    /// Diretório de configuração
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "mood-pet", "mood-pet").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Caminho do arquivo de config
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PetError::configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        debug!("Loading config from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PetError::configuration(format!("Invalid config: {e}")))
    }

    /// Gemini settings: file section first, then environment overrides
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        let mut gemini = GeminiConfig::default();
        if let Some(model) = &self.gemini.model {
            gemini.reply_model = GeminiModel::parse(model)?;
        }
        if let Some(model) = &self.gemini.tts_model {
            gemini.speech_model = GeminiModel::parse(model)?;
        }
        if let Some(voice) = &self.gemini.voice {
            gemini.voice_name.clone_from(voice);
        }
        if let Some(timeout) = self.gemini.timeout_seconds {
            gemini.timeout_seconds = timeout;
        }

        gemini.apply_env()?;
        gemini.validate()?;
        Ok(gemini)
    }

    pub fn validate(&self) -> Result<()> {
        if self.persona.instruction.trim().is_empty() {
            return Err(PetError::configuration("Persona instruction cannot be empty"));
        }
        if self.gestures.petting_threshold == 0 {
            return Err(PetError::configuration("Petting threshold must be positive"));
        }
        if self.mood_decay_ms == 0 || self.sample_rate == 0 || self.mouth_interval_ms == 0 {
            return Err(PetError::configuration(
                "Decay delay, sample rate and mouth interval must be positive",
            ));
        }
        Ok(())
    }

    pub fn mood_decay(&self) -> Duration {
        Duration::from_millis(self.mood_decay_ms)
    }

    pub fn mouth_interval(&self) -> Duration {
        Duration::from_millis(self.mouth_interval_ms)
    }
}
