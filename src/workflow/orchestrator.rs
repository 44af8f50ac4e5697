//! Two-phase generation: identity first, then the logo built from it

use crate::abstractions::{ImageGenerator, TextGenerator};
use crate::error::{Error, Result};
use crate::identity::{
    brand_identity_schema, parse_brand_identity, BrandIdentity, GenerationInput, LogoArtifact,
};
use crate::prompt::{PromptBuilder, LOGO_ASPECT_RATIO};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Everything a successful run produces
#[derive(Debug, Clone, PartialEq)]
pub struct ForgedBrand {
    pub identity: BrandIdentity,
    pub logo: LogoArtifact,
}

/// Sequences the text and image collaborators.
///
/// Every failure comes back as [`Error::IdentitySynthesis`] or
/// [`Error::LogoSynthesis`] carrying the collaborator's message. Nothing is
/// retried and the logo step only runs after the identity step succeeded.
pub struct Orchestrator {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    prompts: PromptBuilder,
    step_timeout: Option<Duration>,
}

impl Orchestrator {
    pub fn new(text: Arc<dyn TextGenerator>, image: Arc<dyn ImageGenerator>) -> Result<Self> {
        Ok(Self {
            text,
            image,
            prompts: PromptBuilder::new()?,
            step_timeout: None,
        })
    }

    /// Bound each remote call; `None` waits indefinitely
    #[must_use]
    pub fn with_step_timeout(mut self, step_timeout: Option<Duration>) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    pub async fn run(&self, input: &GenerationInput) -> Result<ForgedBrand> {
        let identity = self.synthesize_identity(input).await?;
        info!("Identity synthesized for '{}'", identity.company_name);

        let logo = self.synthesize_logo(&identity).await?;
        info!("Logo synthesized ({})", logo.mime_type);

        Ok(ForgedBrand { identity, logo })
    }

    /// Step 1: structured identity from the text model
    pub async fn synthesize_identity(&self, input: &GenerationInput) -> Result<BrandIdentity> {
        let prompt = self
            .prompts
            .identity_prompt(input)
            .map_err(|e| Error::IdentitySynthesis(e.message()))?;
        debug!("Identity prompt:\n{}", prompt);

        let schema = brand_identity_schema();
        let value = self
            .bounded("Identity synthesis", self.text.generate_structured(&prompt, &schema))
            .await
            .map_err(|e| Error::IdentitySynthesis(e.message()))?;

        parse_brand_identity(value)
    }

    /// Step 2: logo mark from the image model
    pub async fn synthesize_logo(&self, identity: &BrandIdentity) -> Result<LogoArtifact> {
        let primary = identity.primary_color().ok_or_else(|| {
            Error::LogoSynthesis("brand identity has no primary color".to_string())
        })?;

        let prompt = self
            .prompts
            .logo_prompt(identity, &primary.hex)
            .map_err(|e| Error::LogoSynthesis(e.message()))?;
        debug!("Logo prompt:\n{}", prompt);

        self.bounded(
            "Logo synthesis",
            self.image.generate_image(&prompt, LOGO_ASPECT_RATIO),
        )
        .await
        .map_err(|e| Error::LogoSynthesis(e.message()))
    }

    async fn bounded<T, F>(&self, step: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.step_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                Error::External(format!("{} timed out after {:?}", step, limit))
            })?,
            None => call.await,
        }
    }
}
