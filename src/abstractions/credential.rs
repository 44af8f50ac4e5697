//! API credential capability
//!
//! The workflow never reads keys directly. It asks a [`CredentialProvider`],
//! which is chosen once at startup: an environment-backed provider when a key
//! is already configured, or an interactive one that asks the user.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::IsTerminal;
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Environment variables consulted for an API key, in priority order
pub const API_KEY_ENV_VARS: &[&str] = &["BRANDFORGE_API_KEY", "GEMINI_API_KEY", "API_KEY"];

/// Reported when a request is attempted with no key at all
pub const MISSING_KEY_MESSAGE: &str = "no API key is configured";

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Whether a non-empty key is currently available
    async fn has_credential(&self) -> bool;

    /// Obtain a (new) key from wherever this provider gets them
    async fn prompt_for_credential(&self) -> Result<()>;

    /// The current key, if any
    async fn api_key(&self) -> Option<String>;
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}

/// Key taken from configuration or the process environment
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialProvider {
    key: Option<String>,
}

impl EnvCredentialProvider {
    pub fn new(key: Option<String>) -> Self {
        Self {
            key: non_empty(key),
        }
    }

    /// Prefer an explicitly configured key, then [`API_KEY_ENV_VARS`]
    pub fn from_environment(configured: Option<String>) -> Self {
        Self::from_lookup(configured, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(configured: Option<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = non_empty(configured).or_else(|| {
            API_KEY_ENV_VARS.iter().find_map(|name| {
                let value = non_empty(lookup(name));
                if value.is_some() {
                    debug!("Using API key from {}", name);
                }
                value
            })
        });
        Self { key }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn has_credential(&self) -> bool {
        self.key.is_some()
    }

    async fn prompt_for_credential(&self) -> Result<()> {
        Err(Error::Credential(format!(
            "no interactive prompt available; set one of {} or `api_key` in the config file",
            API_KEY_ENV_VARS.join(", ")
        )))
    }

    async fn api_key(&self) -> Option<String> {
        self.key.clone()
    }
}

/// Asks the user for a key on a line-oriented reader (stdin in production)
pub struct InteractiveCredentialProvider<R> {
    reader: Mutex<R>,
    key: RwLock<Option<String>>,
}

impl InteractiveCredentialProvider<BufReader<Stdin>> {
    pub fn stdin(initial: Option<String>) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), initial)
    }
}

impl<R> InteractiveCredentialProvider<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, initial: Option<String>) -> Self {
        Self {
            reader: Mutex::new(reader),
            key: RwLock::new(non_empty(initial)),
        }
    }

    fn current(&self) -> Option<String> {
        self.key.read().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl<R> CredentialProvider for InteractiveCredentialProvider<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn has_credential(&self) -> bool {
        self.current().is_some()
    }

    async fn prompt_for_credential(&self) -> Result<()> {
        eprint!("Enter your Gemini API key: ");

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Err(Error::Credential(
                "input closed before an API key was entered".to_string(),
            ));
        }

        let key = non_empty(Some(line))
            .ok_or_else(|| Error::Credential("an empty API key was entered".to_string()))?;

        let mut guard = self
            .key
            .write()
            .map_err(|_| Error::Credential("credential store is poisoned".to_string()))?;
        *guard = Some(key);
        info!("API key updated from interactive prompt");
        Ok(())
    }

    async fn api_key(&self) -> Option<String> {
        self.current()
    }
}

/// Pick the provider for this session.
///
/// On a terminal the user can always be asked, so the configured or exported
/// key only seeds the interactive provider and can be replaced after a
/// rejection. Without a terminal the environment is the only source.
pub fn select_credential_provider(configured: Option<String>) -> Arc<dyn CredentialProvider> {
    let env = EnvCredentialProvider::from_environment(configured);
    if std::io::stdin().is_terminal() {
        debug!("Selected interactive credential provider");
        Arc::new(InteractiveCredentialProvider::stdin(env.key))
    } else {
        debug!("Selected environment credential provider");
        Arc::new(env)
    }
}
