//! Decoding of the base64 PCM payload returned by the speech model.

use crate::errors::{PetError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::time::Duration;

/// Sample rate of the speech model's output
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Decode base64 16-bit little-endian mono PCM into samples in `[-1, 1)`.
pub fn decode_pcm(payload: &str) -> Result<Vec<f32>> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PetError::audio_decode(format!("invalid base64: {e}")))?;

    if bytes.len() % 2 != 0 {
        return Err(PetError::audio_decode(format!(
            "odd PCM byte count: {}",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect())
}

/// How long `samples` last when played at `sample_rate`
pub fn clip_duration(samples: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(samples as f64 / f64::from(sample_rate))
}
