//! Deterministic prompt templates for the identity and logo requests

use crate::error::Result;
use crate::identity::{BrandIdentity, GenerationInput};
use tera::{Context, Tera};

/// Stands in for the company name when the user leaves it blank
pub const UNNAMED_PROJECT: &str = "A new innovative project";

/// Aspect ratio requested for every logo
pub const LOGO_ASPECT_RATIO: &str = "1:1";

const IDENTITY_TEMPLATE_NAME: &str = "identity";
const LOGO_TEMPLATE_NAME: &str = "logo";

const IDENTITY_TEMPLATE: &str = r#"You are a senior brand strategist and creative director at a top-tier design agency.
Build a complete, professional brand identity for the following venture.

Name: {{ name }}
Industry/Sector: {{ sector }}
Mission/Description: {{ description }}
Aesthetic Style: {{ style }}
Core Audience: {{ audience }}

Requirements:
- The mission is visionary; the tagline is provocative and memorable.
- The color palette is avant-garde but professional, with at least 4 colors. List the primary brand color first.
- Typography reasoning is design-focused.
- Market positioning places the venture on two competitor axes, each value between 0 and 100.

Return the brand guide as JSON."#;

const LOGO_TEMPLATE: &str = r#"You are a senior graphic designer specializing in minimalist corporate identity.
Create one professional logo mark for "{{ company_name }}".

CORE CONCEPT: a geometric LETTERMARK built from the capital letter "{{ initial }}".

EXECUTION:
- The mark fills the canvas, leaving only a small safety margin.
- No frame, border or box around the mark.
- STYLE: flat, ultra-minimalist vector design with geometric precision.
- NO TEXT: no characters other than the stylized lettermark itself.
- NO GRADIENTS: a single solid color, {{ primary_hex }}.
- BACKGROUND: pure solid white (#FFFFFF) with no texture, shadow or noise.
- Square composition.

The result is a clean, bold icon fit for a Fortune 500 company."#;

/// Renders both prompts from fixed templates
pub struct PromptBuilder {
    tera: Tera,
}

impl PromptBuilder {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(IDENTITY_TEMPLATE_NAME, IDENTITY_TEMPLATE)?;
        tera.add_raw_template(LOGO_TEMPLATE_NAME, LOGO_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Prompt for the text model
    pub fn identity_prompt(&self, input: &GenerationInput) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", input.name().unwrap_or(UNNAMED_PROJECT));
        context.insert("sector", input.sector.trim());
        context.insert("description", input.description.trim());
        context.insert("style", input.style.trim());
        context.insert("audience", input.audience.trim());

        Ok(self.tera.render(IDENTITY_TEMPLATE_NAME, &context)?)
    }

    /// Prompt for the image model.
    ///
    /// `primary_hex` is passed separately so the caller decides how a missing
    /// palette is handled.
    pub fn logo_prompt(&self, identity: &BrandIdentity, primary_hex: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("company_name", identity.company_name.trim());
        context.insert("initial", &identity.initial().unwrap_or_default());
        context.insert("primary_hex", primary_hex);

        Ok(self.tera.render(LOGO_TEMPLATE_NAME, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ColorSwatch, MarketPositioning, Typography};

    fn input() -> GenerationInput {
        GenerationInput {
            name: None,
            sector: "Aerospace".to_string(),
            description: "orbital logistics".to_string(),
            style: "Minimal".to_string(),
            audience: "engineers".to_string(),
        }
    }

    fn identity(name: &str) -> BrandIdentity {
        BrandIdentity {
            company_name: name.to_string(),
            tagline: "t".to_string(),
            mission: "m".to_string(),
            brand_voice: "v".to_string(),
            target_audience: "a".to_string(),
            keywords: vec![],
            colors: vec![ColorSwatch {
                hex: "#0B3D91".to_string(),
                name: "Blue".to_string(),
                usage: "Primary".to_string(),
            }],
            typography: Typography {
                heading_font: "Inter".to_string(),
                body_font: "Inter".to_string(),
                reasoning: "r".to_string(),
            },
            market_positioning: MarketPositioning {
                axis_x: "x".to_string(),
                axis_y: "y".to_string(),
                value_x: 50.0,
                value_y: 50.0,
            },
        }
    }

    #[test]
    fn test_identity_prompt_includes_inputs() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder.identity_prompt(&input()).unwrap();

        assert!(prompt.contains("Name: A new innovative project"));
        assert!(prompt.contains("Industry/Sector: Aerospace"));
        assert!(prompt.contains("Mission/Description: orbital logistics"));
        assert!(prompt.contains("Aesthetic Style: Minimal"));
        assert!(prompt.contains("Core Audience: engineers"));
    }

    #[test]
    fn test_identity_prompt_is_deterministic() {
        let builder = PromptBuilder::new().unwrap();
        let mut named = input();
        named.name = Some("Luminara".to_string());

        let first = builder.identity_prompt(&named).unwrap();
        let second = builder.identity_prompt(&named).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Name: Luminara"));
    }

    #[test]
    fn test_special_characters_are_not_escaped() {
        let builder = PromptBuilder::new().unwrap();
        let mut quoted = input();
        quoted.description = "R&D for <small> \"sats\"".to_string();

        let prompt = builder.identity_prompt(&quoted).unwrap();
        assert!(prompt.contains("R&D for <small> \"sats\""));
    }

    #[test]
    fn test_logo_prompt_uses_initial_and_primary_color() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder
            .logo_prompt(&identity("  orbitra"), "#0B3D91")
            .unwrap();

        assert!(prompt.contains("capital letter \"O\""));
        assert!(prompt.contains("#0B3D91"));
        assert!(prompt.contains("NO TEXT"));
        assert!(prompt.contains("#FFFFFF"));
        assert!(prompt.contains("\"orbitra\""));
    }
}
