use super::{get_config_dir, Config};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Reads `config.toml` and layers environment overrides on top
pub struct ConfigLoader {
    path: Option<PathBuf>,
    explicit: bool,
}

impl ConfigLoader {
    /// Loader for the default location under the user config directory
    pub fn new() -> Self {
        Self {
            path: get_config_dir().ok().map(|dir| dir.join("config.toml")),
            explicit: false,
        }
    }

    /// Loader for a file the user named; a missing file is an error
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            explicit: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the file (defaults when the default file is absent) without
    /// environment overrides
    pub async fn load_file(&self) -> Result<Config> {
        let Some(path) = &self.path else {
            return Ok(Config::new());
        };

        if !path.exists() {
            if self.explicit {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::new());
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub async fn load(&self) -> Result<Config> {
        let mut config = self.load_file().await?;
        config.merge_env_vars();
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
