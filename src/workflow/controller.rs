//! Single owner of the workflow state

use super::orchestrator::Orchestrator;
use super::state::{
    is_credential_failure, FailureKind, WorkflowResult, WorkflowState, WorkflowStatus,
};
use crate::abstractions::CredentialProvider;
use crate::error::{Error, Result};
use crate::identity::GenerationInput;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Failure message for a run whose caller stopped waiting for it
pub const CANCELLED_MESSAGE: &str = "The forging run was cancelled before it finished.";

/// Drives runs through Idle → Generating → Ready | Failed.
///
/// The controller is the only writer of the state; callers read cloned
/// [`WorkflowResult`] snapshots and mutate only through [`run`](Self::run)
/// and [`reset`](Self::reset). The write lock is dropped while the remote
/// calls are in flight so snapshots stay readable during a run.
pub struct WorkflowController {
    orchestrator: Orchestrator,
    state: Arc<RwLock<WorkflowState>>,
    credential_invalid: AtomicBool,
}

/// Moves an abandoned run from Generating to Failed.
///
/// Armed for the whole in-flight section of [`WorkflowController::run`]; a
/// run future dropped before its final write lands here instead of leaving
/// the controller Generating forever.
struct RunGuard {
    state: Arc<RwLock<WorkflowState>>,
    run_id: Uuid,
    finished: bool,
}

fn abandon(state: &mut WorkflowState, run_id: Uuid) {
    if matches!(state, WorkflowState::Generating { run_id: current } if *current == run_id) {
        warn!("Run {} was dropped before finishing", run_id);
        *state = WorkflowState::failed(FailureKind::Identity, CANCELLED_MESSAGE);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        let run_id = self.run_id;
        match self.state.try_write() {
            Ok(mut state) => abandon(&mut state, run_id),
            Err(_) => {
                // A reader holds the lock; finish the transition once it is free
                let state = self.state.clone();
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        abandon(&mut *state.write().await, run_id);
                    });
                }
            }
        }
    }
}

impl WorkflowController {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            state: Arc::new(RwLock::new(WorkflowState::Idle)),
            credential_invalid: AtomicBool::new(false),
        }
    }

    pub async fn snapshot(&self) -> WorkflowResult {
        WorkflowResult::from(&*self.state.read().await)
    }

    pub async fn status(&self) -> WorkflowStatus {
        self.state.read().await.status()
    }

    /// Run both generation steps for `input`.
    ///
    /// Returns the terminal snapshot (Ready or Failed). Errors are reserved
    /// for calls that never start a run: invalid input, a run already in
    /// flight, or a finished run that has not been reset. Dropping the
    /// returned future mid-run leaves the controller Failed with
    /// [`CANCELLED_MESSAGE`].
    pub async fn run(&self, input: GenerationInput) -> Result<WorkflowResult> {
        input.validate()?;

        let run_id = Uuid::new_v4();
        {
            let mut state = self.state.write().await;
            match &*state {
                WorkflowState::Generating { .. } => return Err(Error::WorkflowBusy),
                WorkflowState::Ready { .. } | WorkflowState::Failed { .. } => {
                    return Err(Error::InvalidTransition(format!(
                        "cannot start a run from {}; reset first",
                        state.status()
                    )))
                }
                WorkflowState::Idle => {}
            }
            *state = WorkflowState::Generating { run_id };
        }
        let mut guard = RunGuard {
            state: self.state.clone(),
            run_id,
            finished: false,
        };
        info!("Run {} started", run_id);

        let outcome = self
            .orchestrator
            .run(&input)
            .instrument(info_span!("forge", %run_id))
            .await;

        let next = match outcome {
            Ok(forged) => {
                info!("Run {} ready", run_id);
                WorkflowState::Ready {
                    identity: forged.identity,
                    logo: forged.logo,
                }
            }
            Err(err) => {
                let kind = match err {
                    Error::LogoSynthesis(_) => FailureKind::Logo,
                    _ => FailureKind::Identity,
                };
                let message = err.message();
                warn!("Run {} failed during {:?} synthesis: {}", run_id, kind, message);

                if is_credential_failure(&message) {
                    warn!("Credential rejected by the model provider");
                    self.credential_invalid.store(true, Ordering::SeqCst);
                }
                WorkflowState::failed(kind, message)
            }
        };

        let mut state = self.state.write().await;
        *state = next;
        guard.finished = true;
        Ok(WorkflowResult::from(&*state))
    }

    /// Run once and, when the failure looks like a rejected key, ask
    /// `credentials` for a new key, reset and run one more time.
    pub async fn run_with_credential_retry(
        &self,
        input: GenerationInput,
        credentials: &dyn CredentialProvider,
    ) -> Result<WorkflowResult> {
        let snapshot = self.run(input.clone()).await?;
        if !(snapshot.is_failed() && self.take_credential_invalid()) {
            return Ok(snapshot);
        }

        warn!("The API key was rejected; asking for a new one");
        credentials.prompt_for_credential().await.map_err(|e| {
            Error::Credential(format!(
                "the API key was rejected and no replacement was provided: {}",
                e.message()
            ))
        })?;
        self.reset().await?;
        self.run(input).await
    }

    /// Drop the current result and return to Idle.
    ///
    /// A no-op when already Idle; rejected while a run is in flight.
    pub async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.is_active() {
            return Err(Error::InvalidTransition(
                "cannot reset while a run is generating".to_string(),
            ));
        }
        *state = WorkflowState::Idle;
        Ok(())
    }

    /// Whether the last failure looked like a rejected credential
    pub fn credential_invalid(&self) -> bool {
        self.credential_invalid.load(Ordering::SeqCst)
    }

    /// Read and clear the credential flag
    pub fn take_credential_invalid(&self) -> bool {
        self.credential_invalid.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstractions::{
        InteractiveCredentialProvider, MockImageGenerator, MockTextGenerator,
    };
    use crate::identity::LogoArtifact;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn controller() -> (WorkflowController, MockTextGenerator) {
        let text = MockTextGenerator::new();
        let image = MockImageGenerator::new();
        let orchestrator = Orchestrator::new(Arc::new(text.clone()), Arc::new(image)).unwrap();
        (WorkflowController::new(orchestrator), text)
    }

    fn input() -> GenerationInput {
        GenerationInput {
            name: None,
            sector: "Aerospace".to_string(),
            description: "orbital logistics".to_string(),
            style: "Minimal".to_string(),
            audience: "engineers".to_string(),
        }
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let (controller, _) = controller();
        assert_eq!(controller.status().await, WorkflowStatus::Idle);
        assert!(!controller.credential_invalid());
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_state_untouched() {
        let (controller, text) = controller();
        let mut bad = input();
        bad.description = " ".to_string();

        let result = controller.run(bad).await;
        assert!(matches!(result, Err(Error::InputValidation(_))));
        assert_eq!(controller.status().await, WorkflowStatus::Idle);
        assert_eq!(text.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_run_must_be_reset_before_rerun() {
        let (controller, text) = controller();
        text.add_error("overloaded").await;

        let snapshot = controller.run(input()).await.unwrap();
        assert!(snapshot.is_failed());
        assert_eq!(snapshot.failure_kind, Some(FailureKind::Identity));

        assert!(matches!(
            controller.run(input()).await,
            Err(Error::InvalidTransition(_))
        ));

        controller.reset().await.unwrap();
        assert_eq!(
            controller.snapshot().await,
            WorkflowResult::from(&WorkflowState::Idle)
        );
    }

    #[tokio::test]
    async fn test_reset_when_idle_is_noop() {
        let (controller, _) = controller();
        controller.reset().await.unwrap();
        assert_eq!(controller.status().await, WorkflowStatus::Idle);
    }

    #[tokio::test]
    async fn test_take_credential_flag_clears_it() {
        let (controller, text) = controller();
        text.add_error("API key not valid. Please pass a valid API key.").await;

        controller.run(input()).await.unwrap();
        assert!(controller.credential_invalid());
        assert!(controller.take_credential_invalid());
        assert!(!controller.credential_invalid());
    }

    fn identity_json() -> serde_json::Value {
        json!({
            "companyName": "Orbitra",
            "tagline": "Beyond the last mile",
            "mission": "Move mass to orbit",
            "brandVoice": "Precise",
            "targetAudience": "Engineers",
            "keywords": ["orbit"],
            "colors": [{"hex": "#0B3D91", "name": "Deep Space", "usage": "Primary"}],
            "typography": {"headingFont": "Inter", "bodyFont": "Inter", "reasoning": "Clarity"},
            "marketPositioning": {"axisX": "Legacy vs New", "axisY": "Budget vs Premium", "valueX": 80, "valueY": 70}
        })
    }

    #[tokio::test]
    async fn test_dropped_run_is_failed_and_resettable() {
        let gate = Arc::new(Notify::new());
        let text = MockTextGenerator::new().with_gate(gate);
        let image = MockImageGenerator::new();
        let orchestrator =
            Orchestrator::new(Arc::new(text.clone()), Arc::new(image)).unwrap();
        let controller = WorkflowController::new(orchestrator);

        let outcome =
            tokio::time::timeout(Duration::from_millis(50), controller.run(input())).await;
        assert!(outcome.is_err());

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, WorkflowStatus::Failed);
        assert_eq!(snapshot.failure_message.as_deref(), Some(CANCELLED_MESSAGE));

        controller.reset().await.unwrap();
        assert_eq!(controller.status().await, WorkflowStatus::Idle);
        assert_eq!(text.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_rejected_key_is_replaced_and_run_retried() {
        let text = MockTextGenerator::new();
        let image = MockImageGenerator::new();
        text.add_error("API key not valid. Please pass a valid API key.").await;
        text.add_response(identity_json()).await;
        image.add_response(LogoArtifact::new(None, "AAAA")).await;

        let orchestrator =
            Orchestrator::new(Arc::new(text.clone()), Arc::new(image.clone())).unwrap();
        let controller = WorkflowController::new(orchestrator);
        let credentials = InteractiveCredentialProvider::new(
            &b"fresh-key\n"[..],
            Some("stale-key".to_string()),
        );

        let result = controller
            .run_with_credential_retry(input(), &credentials)
            .await
            .unwrap();

        assert!(result.is_ready());
        assert_eq!(credentials.api_key().await.as_deref(), Some("fresh-key"));
        assert!(!controller.credential_invalid());
        assert_eq!(text.call_count().await, 2);
        assert_eq!(image.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_generic_failure_is_not_retried() {
        let (controller, text) = controller();
        text.add_error("overloaded").await;
        let credentials =
            InteractiveCredentialProvider::new(&b""[..], Some("key".to_string()));

        let result = controller
            .run_with_credential_retry(input(), &credentials)
            .await
            .unwrap();

        assert!(result.is_failed());
        assert_eq!(text.call_count().await, 1);
        assert_eq!(credentials.api_key().await.as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn test_retry_without_replacement_key_is_a_credential_error() {
        let (controller, text) = controller();
        text.add_error("Requested entity was not found.").await;
        let credentials =
            InteractiveCredentialProvider::new(&b""[..], Some("key".to_string()));

        let result = controller
            .run_with_credential_retry(input(), &credentials)
            .await;

        match result {
            Err(Error::Credential(msg)) => assert!(msg.contains("API key was rejected")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(controller.status().await, WorkflowStatus::Failed);
    }
}
