//! # Mood Pet
//!
//! A virtual pet that answers in a short sentence and a mood. Each turn asks
//! Gemini for a reply, shows it on the face, then asks for the spoken audio
//! and plays it while the mouth moves. Petting and eye-poking gestures start
//! turns of their own with fixed prompts.

pub mod config;
pub mod errors;
pub mod face;
pub mod gemini;
pub mod pet;

pub use config::PetConfig;
pub use errors::{PetError, Result};
pub use gemini::GeminiClient;
pub use pet::{InteractionPipeline, Mood, PetState, StateStore, Submission, TurnOutcome};
