//! Gemini REST integration
//!
//! Implements the text and image collaborators against the
//! `v1beta/models/{model}:generateContent` endpoint.

pub mod api;
pub mod models;

pub use api::{GeminiClient, NO_IMAGE_MESSAGE};
