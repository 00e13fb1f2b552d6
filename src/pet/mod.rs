//! The pet itself: mood, replies, voice and the turn pipeline.

pub mod audio;
pub mod backend;
pub mod decay;
pub mod gesture;
pub mod mood;
pub mod mouth;
pub mod pipeline;
pub mod playback;
pub mod response;
pub mod state;

pub use backend::PetBackend;
pub use decay::DecayTimer;
pub use gesture::{EyeSide, GestureAccumulator};
pub use mood::{Mood, Theme};
pub use mouth::spawn_mouth_animator;
pub use pipeline::{InteractionPipeline, RejectReason, Submission, TurnHandle, TurnOutcome};
pub use playback::{AudioSink, PacedSink, PlaybackController};
pub use response::{decode_reply, PetReply};
pub use state::{PetEvent, PetState, StateStore, TurnPhase};

#[cfg(feature = "speaker")]
pub use playback::SpeakerSink;
