//! Interaction state shared by the pipeline, the timers and any renderer.
//!
//! The state lives inside a `watch` channel so observers get change
//! notifications without polling; discrete happenings (input cleared,
//! speech started/ended) go out on a broadcast channel.

use crate::pet::Mood;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Where the current turn is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Idle,
    RequestingReply,
    RequestingSpeech,
    Playing,
}

/// Snapshot of everything the face needs to draw itself
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PetState {
    pub mood: Mood,
    pub text: String,
    pub phase: TurnPhase,
    pub busy: bool,
    pub speaking: bool,
    pub mouth_open: bool,
    pub left_eye_closed: bool,
    pub right_eye_closed: bool,
}

impl PetState {
    /// True when a new turn could start right now
    pub fn is_idle(&self) -> bool {
        !self.busy && !self.speaking
    }
}

/// Discrete notifications for collaborators outside the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetEvent {
    /// A typed or spoken submission was accepted; the input box should empty
    InputCleared,
    SpeakingStarted,
    SpeakingEnded,
}

const EVENT_CAPACITY: usize = 32;

/// Owner of the single `PetState` instance
#[derive(Clone)]
pub struct StateStore {
    state: Arc<watch::Sender<PetState>>,
    events: broadcast::Sender<PetEvent>,
}

impl StateStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(PetState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(state),
            events,
        }
    }

    pub fn snapshot(&self) -> PetState {
        self.state.borrow().clone()
    }

    /// Mutate the state; subscribers are notified only when `f` returns true.
    pub fn update(&self, f: impl FnOnce(&mut PetState) -> bool) -> bool {
        self.state.send_if_modified(f)
    }

    pub fn subscribe(&self) -> watch::Receiver<PetState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<PetEvent> {
        self.events.subscribe()
    }

    pub fn emit(&self, event: PetEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn set_mood(&self, mood: Mood) -> bool {
        self.update(|s| {
            if s.mood == mood {
                return false;
            }
            s.mood = mood;
            true
        })
    }

    pub fn set_phase(&self, phase: TurnPhase) -> bool {
        self.update(|s| std::mem::replace(&mut s.phase, phase) != phase)
    }

    pub fn set_speaking(&self, speaking: bool) -> bool {
        self.update(|s| std::mem::replace(&mut s.speaking, speaking) != speaking)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
