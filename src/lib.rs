//! # BrandForge
//!
//! Forge a complete brand identity and a matching logo mark from a short
//! business description, using a text model for the identity and an image
//! model for the logo.
//!
//! ## Usage
//!
//! ```bash
//! brandforge forge --sector "Aerospace" --description "orbital logistics" \
//!     --style "Minimal" --audience "engineers" [--name "Orbitra"] [--format html]
//! ```
//!
//! ## Modules
//!
//! - `abstractions` - Trait-based abstractions for the text model, image model and credential source
//! - `config` - Configuration file and environment overrides
//! - `error` - Library error type
//! - `gemini` - Gemini REST client implementing the model abstractions
//! - `guide` - Brand guide export (HTML, Markdown, JSON)
//! - `identity` - Input, identity and logo types plus response schema validation
//! - `prompt` - Deterministic prompt templates
//! - `workflow` - Two-phase generation state machine
pub mod abstractions;
pub mod config;
pub mod error;
pub mod gemini;
pub mod guide;
pub mod identity;
pub mod prompt;
pub mod workflow;

pub use error::{Error, Result};
