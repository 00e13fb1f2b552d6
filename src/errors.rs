use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while running a pet interaction
#[derive(Error, Debug, Clone)]
pub enum PetError {
    /// Transport-level failure talking to the remote service
    #[error("Network error: {0}")]
    NetworkError(Arc<String>),

    /// The remote service answered with a non-success status
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: Arc<String> },

    /// The response decoded but an expected field was missing
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    /// Error when serializing or deserializing JSON
    #[error("Serialization error: {0}")]
    SerializationError(Arc<String>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(Arc<String>),

    /// The audio payload could not be turned into samples
    #[error("Audio decode error: {0}")]
    AudioDecodeError(Arc<String>),

    /// The audio output device failed
    #[error("Playback error: {0}")]
    PlaybackError(Arc<String>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(Arc<std::io::Error>),
}

/// Type alias for Result with PetError
pub type Result<T> = std::result::Result<T, PetError>;

impl PetError {
    pub fn network(message: impl Into<String>) -> Self {
        PetError::NetworkError(Arc::new(message.into()))
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        PetError::SerializationError(Arc::new(message.into()))
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        PetError::ConfigurationError(Arc::new(message.into()))
    }

    pub fn audio_decode(message: impl Into<String>) -> Self {
        PetError::AudioDecodeError(Arc::new(message.into()))
    }

    pub fn playback(message: impl Into<String>) -> Self {
        PetError::PlaybackError(Arc::new(message.into()))
    }
}

impl From<std::io::Error> for PetError {
    fn from(error: std::io::Error) -> Self {
        PetError::IoError(Arc::new(error))
    }
}

impl From<serde_json::Error> for PetError {
    fn from(error: serde_json::Error) -> Self {
        PetError::serialization(error.to_string())
    }
}

impl From<reqwest::Error> for PetError {
    fn from(error: reqwest::Error) -> Self {
        PetError::network(error.to_string())
    }
}
