//! The remote side of a turn: one call for the reply, one for its audio.

use crate::errors::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PetBackend: Send + Sync {
    /// Without a credential no remote call is attempted
    fn has_credential(&self) -> bool {
        true
    }

    /// Send the full prompt, get back the model's raw text
    async fn generate_reply(&self, prompt: &str) -> Result<String>;

    /// Send the text to speak, get back base64 16-bit PCM
    async fn synthesize_speech(&self, prompt: &str) -> Result<String>;
}
