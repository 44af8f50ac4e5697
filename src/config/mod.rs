use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Get the directory holding `config.toml`
pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "brandforge", "brandforge")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

/// Brand guide output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Config(format!("unknown output format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub text_model: String,
    pub image_model: String,
    /// Upper bound on each model call; 0 disables the bound
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: "info".to_string(),
            output_format: OutputFormat::Html,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|name| std::env::var(name).ok());
    }

    /// Apply `BRANDFORGE_*` overrides using `lookup` to read variables.
    /// Unparseable numeric values are ignored.
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("BRANDFORGE_API_KEY") {
            self.api_key = Some(api_key);
        }

        if let Some(url) = lookup("BRANDFORGE_API_BASE_URL") {
            self.api_base_url = url;
        }

        if let Some(model) = lookup("BRANDFORGE_TEXT_MODEL") {
            self.text_model = model;
        }

        if let Some(model) = lookup("BRANDFORGE_IMAGE_MODEL") {
            self.image_model = model;
        }

        if let Some(timeout) = lookup("BRANDFORGE_REQUEST_TIMEOUT_SECS") {
            if let Ok(value) = timeout.trim().parse::<u64>() {
                self.request_timeout_secs = value;
            }
        }

        if let Some(log_level) = lookup("BRANDFORGE_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Some(format) = lookup("BRANDFORGE_OUTPUT_FORMAT") {
            if let Ok(value) = format.parse::<OutputFormat>() {
                self.output_format = value;
            }
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Copy suitable for display, with the API key masked
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("********".to_string());
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(config.output_format, OutputFormat::Html);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BRANDFORGE_API_KEY", "k"),
            ("BRANDFORGE_TEXT_MODEL", "text-x"),
            ("BRANDFORGE_REQUEST_TIMEOUT_SECS", "0"),
            ("BRANDFORGE_OUTPUT_FORMAT", "md"),
            ("BRANDFORGE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::new();
        config.merge_env_with(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.text_model, "text-x");
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.output_format, OutputFormat::Markdown);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_bad_numeric_override_is_ignored() {
        let mut config = Config::new();
        config.merge_env_with(|name| {
            (name == "BRANDFORGE_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_redacted_masks_key() {
        let mut config = Config::new();
        config.api_key = Some("secret".to_string());
        assert_eq!(config.redacted().api_key.as_deref(), Some("********"));
        assert!(Config::new().redacted().api_key.is_none());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("HTML".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Markdown.extension(), "md");
    }
}
