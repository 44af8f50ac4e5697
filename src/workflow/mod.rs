//! Two-phase generation workflow
//!
//! - [`orchestrator`] sequences the identity and logo requests
//! - [`state`] defines the Idle/Generating/Ready/Failed machine and snapshots
//! - [`controller`] owns the state and exposes `run`/`reset`

pub mod controller;
pub mod orchestrator;
pub mod state;

pub use controller::{WorkflowController, CANCELLED_MESSAGE};
pub use orchestrator::{ForgedBrand, Orchestrator};
pub use state::{
    is_credential_failure, FailureKind, WorkflowResult, WorkflowState, WorkflowStatus,
    CREDENTIAL_SIGNATURES,
};
