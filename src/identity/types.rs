//! Core identity data types

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex"));

/// What the user tells us about the business
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInput {
    /// Optional working name; the model invents one when absent
    #[serde(default)]
    pub name: Option<String>,
    pub sector: String,
    pub description: String,
    pub style: String,
    pub audience: String,
}

impl GenerationInput {
    /// Reject blank required fields.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("sector", &self.sector),
            ("description", &self.description),
            ("style", &self.style),
            ("audience", &self.audience),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::InputValidation(format!(
                "required field(s) empty: {}",
                missing.join(", ")
            )))
        }
    }

    /// The supplied name, if it has any content
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub hex: String,
    pub name: String,
    pub usage: String,
}

impl ColorSwatch {
    /// Whether `hex` looks like `#RRGGBB`. Advisory only.
    pub fn has_valid_hex(&self) -> bool {
        HEX_COLOR.is_match(&self.hex)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub reasoning: String,
}

/// Single point on a two-axis competitor map.
///
/// Values are nominally 0-100 but are never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPositioning {
    pub axis_x: String,
    pub axis_y: String,
    pub value_x: f64,
    pub value_y: f64,
}

/// Structured brand guide returned by the text model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandIdentity {
    pub company_name: String,
    pub tagline: String,
    pub mission: String,
    pub brand_voice: String,
    pub target_audience: String,
    pub keywords: Vec<String>,
    pub colors: Vec<ColorSwatch>,
    pub typography: Typography,
    pub market_positioning: MarketPositioning,
}

impl BrandIdentity {
    /// First swatch in the palette, which drives the logo color
    pub fn primary_color(&self) -> Option<&ColorSwatch> {
        self.colors.first()
    }

    /// Uppercased first character of the trimmed company name
    pub fn initial(&self) -> Option<String> {
        self.company_name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
    }
}

/// Generated logo image, kept as the base64 payload the model returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoArtifact {
    pub mime_type: String,
    pub data: String,
}

impl LogoArtifact {
    pub const DEFAULT_MIME_TYPE: &'static str = "image/png";

    pub fn new(mime_type: Option<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_MIME_TYPE.to_string()),
            data: data.into(),
        }
    }

    /// Displayable reference for embedding in documents
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
