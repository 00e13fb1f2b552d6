//! Google Gemini integration module
//!
//! Text replies and speech synthesis both go through the `generateContent`
//! endpoint; the pet only ever needs those two calls.

pub mod client;
pub mod config;
pub mod models;

pub use client::GeminiClient;
pub use config::{GeminiConfig, GeminiModel};
pub use models::*;
