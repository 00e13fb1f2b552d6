//! Google Gemini HTTP client implementation

use crate::errors::{PetError, Result};
use crate::gemini::{GeminiConfig, GeminiModel, GenerateContentRequest, GenerateContentResponse};
use crate::pet::PetBackend;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Google Gemini HTTP client
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("mood-pet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PetError::network(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Gemini client initialized: reply={}, speech={}, voice={}",
            config.reply_model, config.speech_model, config.voice_name
        );

        Ok(Self { config, client })
    }

    /// Make a single request to the Gemini API. Failures are not retried.
    pub async fn generate_content(
        &self,
        model: &GeminiModel,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.config.endpoint_url(&model.endpoint());

        debug!("Making Gemini API request to model {}", model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| PetError::network(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            error!("Gemini API error {}: {}", status, error_text);
            return Err(PetError::ApiError {
                status: status.as_u16(),
                body: Arc::new(error_text),
            });
        }

        let gemini_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                PetError::serialization(format!("Failed to parse response: {}", e.without_url()))
            })?;

        if let Some(reason) = gemini_response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Gemini finished with {}", reason);
        }

        if gemini_response.is_blocked() {
            warn!("Gemini response was blocked or empty");
            return Err(PetError::MissingField("candidates"));
        }

        Ok(gemini_response)
    }

    /// Get configuration
    pub fn get_config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl PetBackend for GeminiClient {
    fn has_credential(&self) -> bool {
        self.config.has_credential()
    }

    async fn generate_reply(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::new_text(prompt);
        let response = self
            .generate_content(&self.config.reply_model, &request)
            .await?;

        response.get_text().ok_or(PetError::MissingField("text"))
    }

    async fn synthesize_speech(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::new_speech(prompt, &self.config.voice_name);
        let response = self
            .generate_content(&self.config.speech_model, &request)
            .await?;

        let inline = response
            .get_inline_data()
            .ok_or(PetError::MissingField("inlineData"))?;
        debug!(
            "Received {} bytes of base64 audio ({})",
            inline.data.len(),
            inline.mime_type
        );
        Ok(inline.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = GeminiConfig {
            api_key: "AIzaTestKey".to_string(),
            ..Default::default()
        };
        let client = GeminiClient::new(config).expect("client");
        assert!(client.has_credential());
        assert_eq!(client.get_config().voice_name, "Kore");
    }

    #[test]
    fn test_client_without_key_has_no_credential() {
        let client = GeminiClient::new(GeminiConfig::default()).expect("client");
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_failed_request_does_not_leak_key() {
        let config = GeminiConfig {
            api_key: "AIzaSECRET123".to_string(),
            base_url: "http://127.0.0.1:1/v1beta".to_string(),
            timeout_seconds: 5,
            ..Default::default()
        };
        let client = GeminiClient::new(config).expect("client");

        let err = client
            .generate_reply("olá")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, PetError::NetworkError(_)));
        assert!(!err.to_string().contains("AIzaSECRET123"));
        assert!(!format!("{err:?}").contains("AIzaSECRET123"));
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = GeminiConfig {
            api_key: "sk-not-google".to_string(),
            ..Default::default()
        };
        assert!(GeminiClient::new(config).is_err());
    }
}
