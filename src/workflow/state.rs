//! Workflow state machine implementation

use crate::abstractions::credential::MISSING_KEY_MESSAGE;
use crate::error::FALLBACK_FAILURE_MESSAGE;
use crate::identity::{BrandIdentity, LogoArtifact};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Failure messages that mean the API key is missing, wrong or revoked
pub const CREDENTIAL_SIGNATURES: &[&str] = &[
    "Requested entity was not found",
    "API key not valid",
    MISSING_KEY_MESSAGE,
];

/// Whether a failure message should trigger a credential re-prompt
pub fn is_credential_failure(message: &str) -> bool {
    CREDENTIAL_SIGNATURES
        .iter()
        .any(|signature| message.contains(signature))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Idle,
    Generating,
    Ready,
    Failed,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkflowStatus::Idle => "idle",
            WorkflowStatus::Generating => "generating",
            WorkflowStatus::Ready => "ready",
            WorkflowStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Which step a failed run died in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Identity,
    Logo,
}

/// Internal state owned by the controller.
///
/// Each variant carries exactly the data valid for it, so a logo can never
/// exist without an identity and a failure never without a message.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Generating {
        run_id: Uuid,
    },
    Ready {
        identity: BrandIdentity,
        logo: LogoArtifact,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl WorkflowState {
    /// Failed state with a guaranteed non-empty message
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            message
        };
        WorkflowState::Failed { kind, message }
    }

    pub fn status(&self) -> WorkflowStatus {
        match self {
            WorkflowState::Idle => WorkflowStatus::Idle,
            WorkflowState::Generating { .. } => WorkflowStatus::Generating,
            WorkflowState::Ready { .. } => WorkflowStatus::Ready,
            WorkflowState::Failed { .. } => WorkflowStatus::Failed,
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Ready { .. } | WorkflowState::Failed { .. })
    }

    /// Check if a run is in flight
    pub fn is_active(&self) -> bool {
        matches!(self, WorkflowState::Generating { .. })
    }
}

/// Read-only view of the workflow handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub status: WorkflowStatus,
    pub identity: Option<BrandIdentity>,
    pub logo: Option<LogoArtifact>,
    pub failure_message: Option<String>,
    pub failure_kind: Option<FailureKind>,
}

impl From<&WorkflowState> for WorkflowResult {
    fn from(state: &WorkflowState) -> Self {
        let mut result = WorkflowResult {
            status: state.status(),
            identity: None,
            logo: None,
            failure_message: None,
            failure_kind: None,
        };

        match state {
            WorkflowState::Ready { identity, logo } => {
                result.identity = Some(identity.clone());
                result.logo = Some(logo.clone());
            }
            WorkflowState::Failed { kind, message } => {
                result.failure_message = Some(message.clone());
                result.failure_kind = Some(*kind);
            }
            WorkflowState::Idle | WorkflowState::Generating { .. } => {}
        }

        result
    }
}

impl WorkflowResult {
    pub fn is_ready(&self) -> bool {
        self.status == WorkflowStatus::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.status == WorkflowStatus::Failed
    }

    /// Identity and logo together, only when the run is Ready
    pub fn ready_parts(&self) -> Option<(&BrandIdentity, &LogoArtifact)> {
        match (self.status, &self.identity, &self.logo) {
            (WorkflowStatus::Ready, Some(identity), Some(logo)) => Some((identity, logo)),
            _ => None,
        }
    }
}
