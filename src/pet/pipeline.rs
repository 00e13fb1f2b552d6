//! One turn of conversation with the pet.
//!
//! A turn runs `Idle -> RequestingReply -> RequestingSpeech -> Playing -> Idle`.
//! Only one turn exists at a time: the single permit is taken synchronously
//! when a submission is accepted, and any submission arriving while it is held
//! is dropped rather than queued. Failures end the turn early and are only
//! logged; the pet always returns to idle.

use crate::config::PetConfig;
use crate::errors::PetError;
use crate::pet::audio::decode_pcm;
use crate::pet::response::{decode_reply, PetReply};
use crate::pet::{
    DecayTimer, Mood, PetBackend, PetEvent, PlaybackController, StateStore, TurnPhase,
};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// What started a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Typed text or a speech transcript
    Text(String),
    /// Fixed prompt standing in for a gesture
    Synthetic(String),
}

impl Submission {
    pub fn text(text: impl Into<String>) -> Self {
        Submission::Text(text.into())
    }

    pub fn synthetic(prompt: impl Into<String>) -> Self {
        Submission::Synthetic(prompt.into())
    }

    fn content(&self) -> &str {
        match self {
            Submission::Text(text) => text.trim(),
            Submission::Synthetic(prompt) => prompt,
        }
    }

    fn is_user(&self) -> bool {
        matches!(self, Submission::Text(_))
    }
}

/// Why a submission did not start a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoCredential,
    EmptyInput,
    Busy,
}

/// How a turn ended
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The reply was shown; `played` says whether its audio was heard
    Completed { reply: PetReply, played: bool },
    Rejected(RejectReason),
    /// A remote call failed; whatever was already shown stays
    Failed(PetError),
}

impl TurnOutcome {
    pub fn reply(&self) -> Option<&PetReply> {
        match self {
            TurnOutcome::Completed { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

pub type TurnHandle = JoinHandle<TurnOutcome>;

/// Held for the whole turn; dropping it returns the pet to idle.
struct BusyGuard {
    store: StateStore,
    permit: Option<OwnedSemaphorePermit>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        // Free the permit first so anyone who sees `busy == false` can start a turn.
        drop(self.permit.take());
        self.store.update(|s| {
            s.phase = TurnPhase::Idle;
            s.busy = false;
            true
        });
    }
}

struct PipelineInner {
    backend: Arc<dyn PetBackend>,
    playback: PlaybackController,
    store: StateStore,
    decay: DecayTimer,
    permit: Arc<Semaphore>,
    instruction: String,
    speech_prefix: String,
    sample_rate: u32,
}

/// Orchestrates turns. Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct InteractionPipeline {
    inner: Arc<PipelineInner>,
}

impl InteractionPipeline {
    pub fn new(
        backend: Arc<dyn PetBackend>,
        playback: PlaybackController,
        store: StateStore,
        config: &PetConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                backend,
                playback,
                store,
                decay: DecayTimer::new(config.mood_decay()),
                permit: Arc::new(Semaphore::new(1)),
                instruction: config.persona.instruction.clone(),
                speech_prefix: config.persona.speech_prefix.clone(),
                sample_rate: config.sample_rate,
            }),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.inner.store
    }

    /// Neither fetching nor speaking
    pub fn is_idle(&self) -> bool {
        self.inner.store.snapshot().is_idle()
    }

    /// Run a turn to completion on the current task
    pub async fn interact(&self, submission: Submission) -> TurnOutcome {
        match self.begin(&submission) {
            Ok(busy) => self.run_turn(submission, busy).await,
            Err(reason) => TurnOutcome::Rejected(reason),
        }
    }

    /// Accept the submission now and run the turn in the background
    pub fn try_start(&self, submission: Submission) -> Result<TurnHandle, RejectReason> {
        let busy = self.begin(&submission)?;
        let pipeline = self.clone();
        Ok(tokio::spawn(async move {
            pipeline.run_turn(submission, busy).await
        }))
    }

    fn begin(&self, submission: &Submission) -> Result<BusyGuard, RejectReason> {
        let inner = &self.inner;

        if !inner.backend.has_credential() {
            debug!("No API key configured, ignoring submission");
            return Err(RejectReason::NoCredential);
        }

        if submission.content().is_empty() {
            return Err(RejectReason::EmptyInput);
        }

        let permit = Arc::clone(&inner.permit)
            .try_acquire_owned()
            .map_err(|_| {
                debug!("Turn already in flight, dropping submission");
                RejectReason::Busy
            })?;

        // The previous reply's countdown must not fire while this turn is in flight
        inner.decay.cancel();
        inner.store.update(|s| {
            s.busy = true;
            s.phase = TurnPhase::RequestingReply;
            true
        });
        if submission.is_user() {
            inner.store.emit(PetEvent::InputCleared);
        }

        Ok(BusyGuard {
            store: inner.store.clone(),
            permit: Some(permit),
        })
    }

    async fn run_turn(&self, submission: Submission, _busy: BusyGuard) -> TurnOutcome {
        let inner = &self.inner;
        inner.playback.warm_up().await;

        info!(
            "Turn started ({})",
            if submission.is_user() { "user" } else { "gesture" }
        );

        let prompt = format!("{}{}", inner.instruction, submission.content());
        let raw = match inner.backend.generate_reply(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Reply request failed: {}", e);
                inner.decay.arm(&inner.store);
                return TurnOutcome::Failed(e);
            }
        };

        let reply = decode_reply(&raw);
        self.show(&reply);

        if reply.text.trim().is_empty() {
            debug!("Reply has nothing to say");
            return TurnOutcome::Completed {
                reply,
                played: false,
            };
        }

        inner.store.set_phase(TurnPhase::RequestingSpeech);
        let speech_prompt = format!("{}{}", inner.speech_prefix, reply.text);
        let payload = match inner.backend.synthesize_speech(&speech_prompt).await {
            Ok(payload) => payload,
            Err(e) => {
                error!("Speech request failed: {}", e);
                return TurnOutcome::Failed(e);
            }
        };

        let samples = match decode_pcm(&payload) {
            Ok(samples) => samples,
            Err(e) => {
                warn!("Skipping audio: {}", e);
                return TurnOutcome::Completed {
                    reply,
                    played: false,
                };
            }
        };

        inner.store.set_phase(TurnPhase::Playing);
        let played = inner.playback.play(samples, inner.sample_rate).await;
        debug!("Turn finished (played: {})", played);

        TurnOutcome::Completed { reply, played }
    }

    /// Put the reply on the face and restart the decay countdown
    fn show(&self, reply: &PetReply) {
        let mood = Mood::from_label(&reply.mood).unwrap_or_else(|| {
            warn!("Unrecognised mood '{}', drawing default theme", reply.mood);
            Mood::Neutral
        });

        self.inner.store.update(|s| {
            s.mood = mood;
            s.text.clone_from(&reply.text);
            true
        });
        self.inner.decay.arm(&self.inner.store);
    }
}
