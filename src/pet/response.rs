//! Turns whatever the language model said into a `{text, mood}` record.
//!
//! The model is asked for bare JSON but routinely wraps it in prose or
//! markdown fences. Decoding never fails: anything unusable becomes the raw
//! text with the `happy` fallback mood.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Mood label used when the reply carries no usable structure
pub const FALLBACK_MOOD: &str = "happy";

/// A decoded reply. `mood` is passed through exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetReply {
    pub text: String,
    pub mood: String,
}

#[derive(Deserialize)]
struct StructuredReply {
    text: Option<String>,
    mood: Option<String>,
}

lazy_static! {
    static ref OBJECT: Regex = Regex::new(r"(?s)\{.*\}").expect("static regex");
}

/// Decode a raw model reply
pub fn decode_reply(raw: &str) -> PetReply {
    OBJECT
        .find(raw)
        .and_then(|found| serde_json::from_str::<StructuredReply>(found.as_str()).ok())
        .and_then(|reply| match (reply.text, reply.mood) {
            (Some(text), Some(mood)) => Some(PetReply { text, mood }),
            _ => None,
        })
        .unwrap_or_else(|| fallback(raw))
}

fn fallback(raw: &str) -> PetReply {
    let text: String = raw
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"'))
        .collect();

    PetReply {
        text: text.trim().to_string(),
        mood: FALLBACK_MOOD.to_string(),
    }
}
