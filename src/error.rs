use thiserror::Error;

/// Message used when a collaborator fails without saying why.
pub const FALLBACK_FAILURE_MESSAGE: &str =
    "The forging process was interrupted by a synthesis error.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Identity synthesis failed: {0}")]
    IdentitySynthesis(String),

    #[error("Logo synthesis failed: {0}")]
    LogoSynthesis(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("A generation run is already in progress")]
    WorkflowBusy,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    External(String),
}

impl Error {
    /// The collaborator's own message, without the variant prefix.
    ///
    /// Failed workflow snapshots carry this verbatim so the remote wording
    /// (including credential signatures) survives the trip to the user.
    pub fn message(&self) -> String {
        let raw = match self {
            Error::InputValidation(msg)
            | Error::IdentitySynthesis(msg)
            | Error::LogoSynthesis(msg)
            | Error::Credential(msg)
            | Error::InvalidTransition(msg)
            | Error::Config(msg)
            | Error::External(msg) => msg.clone(),
            other => other.to_string(),
        };

        if raw.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            raw
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_variant_prefix() {
        let err = Error::IdentitySynthesis("Requested entity was not found.".to_string());
        assert_eq!(err.message(), "Requested entity was not found.");
        assert_eq!(
            err.to_string(),
            "Identity synthesis failed: Requested entity was not found."
        );
    }

    #[test]
    fn test_empty_message_uses_fallback() {
        let err = Error::LogoSynthesis("   ".to_string());
        assert_eq!(err.message(), FALLBACK_FAILURE_MESSAGE);
    }

    #[test]
    fn test_guard_errors_have_messages() {
        assert!(!Error::WorkflowBusy.message().is_empty());
        assert_eq!(
            Error::InvalidTransition("reset while generating".to_string()).message(),
            "reset while generating"
        );
    }
}
