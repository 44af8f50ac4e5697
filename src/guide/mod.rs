//! Brand guide export
//!
//! Turns a Ready workflow snapshot into a standalone document. HTML output is
//! printable and embeds the logo as a data URI, Markdown mirrors the same
//! sections, and JSON carries the raw identity for other tools.

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::identity::{BrandIdentity, ColorSwatch, LogoArtifact};
use crate::workflow::WorkflowResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

const HTML_TEMPLATE_NAME: &str = "brand_guide.html";
const MARKDOWN_TEMPLATE_NAME: &str = "brand_guide.md";

const HTML_TEMPLATE: &str = include_str!("templates/brand_guide.html.tera");
const MARKDOWN_TEMPLATE: &str = include_str!("templates/brand_guide.md.tera");

/// Side of the square positioning plot, in SVG units
const PLOT_SIZE: f64 = 200.0;

#[derive(Debug, Serialize)]
struct TypographyView<'a> {
    heading_font: &'a str,
    body_font: &'a str,
    reasoning: &'a str,
}

#[derive(Debug, Serialize)]
struct PositioningView<'a> {
    axis_x: &'a str,
    axis_y: &'a str,
    value_x: f64,
    value_y: f64,
    plot_x: f64,
    plot_y: f64,
}

#[derive(Debug, Serialize)]
struct GuideView<'a> {
    company_name: &'a str,
    tagline: &'a str,
    mission: &'a str,
    brand_voice: &'a str,
    target_audience: &'a str,
    keywords: &'a [String],
    colors: &'a [ColorSwatch],
    primary_hex: &'a str,
    typography: TypographyView<'a>,
    positioning: PositioningView<'a>,
    logo_uri: String,
    generated_at: String,
}

/// Map a 0-100 value onto the plot; out-of-range points sit on the border
fn plot_coordinate(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0) / 100.0 * PLOT_SIZE
    } else {
        PLOT_SIZE / 2.0
    }
}

impl<'a> GuideView<'a> {
    fn new(identity: &'a BrandIdentity, logo: &LogoArtifact, generated_at: DateTime<Utc>) -> Self {
        let positioning = &identity.market_positioning;
        Self {
            company_name: &identity.company_name,
            tagline: &identity.tagline,
            mission: &identity.mission,
            brand_voice: &identity.brand_voice,
            target_audience: &identity.target_audience,
            keywords: &identity.keywords,
            colors: &identity.colors,
            primary_hex: identity
                .primary_color()
                .map(|c| c.hex.as_str())
                .unwrap_or("#000000"),
            typography: TypographyView {
                heading_font: &identity.typography.heading_font,
                body_font: &identity.typography.body_font,
                reasoning: &identity.typography.reasoning,
            },
            positioning: PositioningView {
                axis_x: &positioning.axis_x,
                axis_y: &positioning.axis_y,
                value_x: positioning.value_x,
                value_y: positioning.value_y,
                plot_x: plot_coordinate(positioning.value_x),
                // SVG y grows downwards
                plot_y: PLOT_SIZE - plot_coordinate(positioning.value_y),
            },
            logo_uri: logo.to_data_uri(),
            generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    identity: &'a BrandIdentity,
    logo_mime_type: &'a str,
    logo_data_uri: String,
    generated_at: DateTime<Utc>,
}

/// Quote a value as a CSS string for use inside `<style>`, where HTML
/// escaping does not apply
fn css_string(value: &tera::Value, _: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("css_string expects a string"))?;

    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            // `</style>` must not appear inside the value
            '<' => quoted.push_str("\\3c "),
            c if c.is_control() => quoted.push(' '),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Ok(tera::Value::String(quoted))
}

/// Make a value safe for a single Markdown table cell
fn md_cell(value: &tera::Value, _: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("md_cell expects a string"))?;

    let cell = text
        .replace('|', "\\|")
        .replace(|c: char| c.is_control(), " ");
    Ok(tera::Value::String(cell))
}

/// Renders brand guides from fixed templates
pub struct GuideRenderer {
    tera: Tera,
}

impl GuideRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("css_string", css_string);
        tera.register_filter("md_cell", md_cell);
        tera.add_raw_templates(vec![
            (HTML_TEMPLATE_NAME, HTML_TEMPLATE),
            (MARKDOWN_TEMPLATE_NAME, MARKDOWN_TEMPLATE),
        ])?;
        Ok(Self { tera })
    }

    pub fn render(&self, result: &WorkflowResult, format: OutputFormat) -> Result<String> {
        self.render_at(result, format, Utc::now())
    }

    /// Render with a fixed timestamp
    pub fn render_at(
        &self,
        result: &WorkflowResult,
        format: OutputFormat,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        let (identity, logo) = result.ready_parts().ok_or_else(|| {
            Error::InvalidTransition(format!(
                "a brand guide needs a ready workflow, current status is {}",
                result.status
            ))
        })?;

        match format {
            OutputFormat::Json => {
                let export = JsonExport {
                    identity,
                    logo_mime_type: &logo.mime_type,
                    logo_data_uri: logo.to_data_uri(),
                    generated_at,
                };
                Ok(serde_json::to_string_pretty(&export)?)
            }
            OutputFormat::Html | OutputFormat::Markdown => {
                let view = GuideView::new(identity, logo, generated_at);
                let context = Context::from_serialize(&view)?;
                let template = if format == OutputFormat::Html {
                    HTML_TEMPLATE_NAME
                } else {
                    MARKDOWN_TEMPLATE_NAME
                };
                Ok(self.tera.render(template, &context)?)
            }
        }
    }
}
