//! Abstraction layers for external collaborators
//!
//! This module provides trait-based abstractions for the generative models
//! and the credential source so the workflow can be driven by mocks in tests
//! and by the Gemini client in production.

pub mod credential;
pub mod image;
pub mod text;

pub use credential::{
    select_credential_provider, CredentialProvider, EnvCredentialProvider,
    InteractiveCredentialProvider, API_KEY_ENV_VARS, MISSING_KEY_MESSAGE,
};
pub use image::{ImageGenerator, MockImageGenerator};
pub use text::{MockTextGenerator, TextGenerator};
