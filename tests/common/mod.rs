//! Shared helpers for the pipeline and gesture tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use mood_pet::pet::{PacedSink, PetBackend, PlaybackController};
use mood_pet::{InteractionPipeline, PetConfig, PetError, Result, StateStore};

pub const HAPPY_REPLY: &str = r#"{"text": "Olá!", "mood": "happy"}"#;

/// Base64 PCM lasting `millis` at 24 kHz
pub fn pcm_payload(millis: u64) -> String {
    let samples = 24 * millis as usize;
    let bytes: Vec<u8> = (0..samples)
        .flat_map(|i| ((i % 200) as i16 * 100).to_le_bytes())
        .collect();
    STANDARD.encode(bytes)
}

/// Backend answering from queues, recording every prompt it receives
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    speech: Mutex<VecDeque<Result<String>>>,
    reply_prompts: Mutex<Vec<String>>,
    speech_prompts: Mutex<Vec<String>>,
    reply_delay: Duration,
    credential: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            speech: Mutex::new(VecDeque::new()),
            reply_prompts: Mutex::new(Vec::new()),
            speech_prompts: Mutex::new(Vec::new()),
            reply_delay: Duration::ZERO,
            credential: true,
        }
    }

    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::new()
        }
    }

    pub fn with_reply_delay(delay: Duration) -> Self {
        Self {
            reply_delay: delay,
            ..Self::new()
        }
    }

    pub fn push_reply(&self, reply: Result<String>) {
        self.replies.lock().expect("lock").push_back(reply);
    }

    pub fn push_speech(&self, speech: Result<String>) {
        self.speech.lock().expect("lock").push_back(speech);
    }

    pub fn reply_prompts(&self) -> Vec<String> {
        self.reply_prompts.lock().expect("lock").clone()
    }

    pub fn speech_prompts(&self) -> Vec<String> {
        self.speech_prompts.lock().expect("lock").clone()
    }

    pub fn reply_calls(&self) -> usize {
        self.reply_prompts.lock().expect("lock").len()
    }
}

#[async_trait]
impl PetBackend for ScriptedBackend {
    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate_reply(&self, prompt: &str) -> Result<String> {
        self.reply_prompts.lock().expect("lock").push(prompt.to_string());
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }
        let next = self.replies.lock().expect("lock").pop_front();
        next.unwrap_or_else(|| Ok(HAPPY_REPLY.to_string()))
    }

    async fn synthesize_speech(&self, prompt: &str) -> Result<String> {
        self.speech_prompts.lock().expect("lock").push(prompt.to_string());
        let next = self.speech.lock().expect("lock").pop_front();
        next.unwrap_or_else(|| Ok(pcm_payload(100)))
    }
}

pub fn network_error() -> PetError {
    PetError::network("connection reset")
}

/// Pipeline over `backend` with default settings and a paced sink
pub fn pipeline_with(backend: &Arc<ScriptedBackend>, config: &PetConfig) -> InteractionPipeline {
    let store = StateStore::new();
    let playback = PlaybackController::new(Arc::new(PacedSink), store.clone());
    let backend: Arc<dyn PetBackend> = backend.clone();
    InteractionPipeline::new(backend, playback, store, config)
}

pub fn pipeline(backend: &Arc<ScriptedBackend>) -> InteractionPipeline {
    pipeline_with(backend, &PetConfig::default())
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
