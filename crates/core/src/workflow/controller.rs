//! Owns the single live [`WorkflowState`] for one session and applies exactly
//! one transition per resolved read or submission.

use tracing::{debug, info, warn};

use crate::audit::{AuditContext, AuditSink};
use crate::csv::{screen_upload, MAX_FILE_SIZE_BYTES};
use crate::domain::policy::{Alert, PolicyRecord, SubmissionOutcome, ValidationSummary};
use crate::errors::{ApplicationError, DomainError};
use crate::gateway::{ContentSource, SubmissionGateway};
use crate::workflow::engine::{WorkflowEngine, WorkflowTransitionError};
use crate::workflow::states::{TransitionOutcome, WorkflowEvent, WorkflowState};

pub struct WorkflowController<G, S> {
    engine: WorkflowEngine,
    gateway: G,
    sink: S,
    audit: AuditContext,
    max_file_size_bytes: u64,
    state: WorkflowState,
}

impl<G, S> WorkflowController<G, S>
where
    G: SubmissionGateway,
    S: AuditSink,
{
    pub fn new(gateway: G, sink: S, audit: AuditContext) -> Self {
        let engine = WorkflowEngine::new();
        Self {
            state: engine.initial_state(),
            engine,
            gateway,
            sink,
            audit,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size_bytes: u64) -> Self {
        self.max_file_size_bytes = max_file_size_bytes;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn records(&self) -> &[PolicyRecord] {
        self.state.records()
    }

    pub fn alert(&self) -> Option<Alert> {
        self.state.alert()
    }

    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.state.outcome()
    }

    pub fn summary(&self) -> ValidationSummary {
        self.state.summary()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn has_loaded_file(&self) -> bool {
        self.state.has_loaded_file()
    }

    pub fn can_submit(&self) -> bool {
        self.state.can_submit()
    }

    pub fn can_reset(&self) -> bool {
        self.state.can_reset()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Loads already-read CSV text.
    pub fn load_content(&mut self, content: &str) -> Result<&WorkflowState, ApplicationError> {
        self.dispatch(WorkflowEvent::ContentLoaded { content: content.to_owned() })?;
        Ok(&self.state)
    }

    /// Screens the upload, reads it, and loads the records it contains.
    ///
    /// Screening and read failures are recovered here: the state moves to
    /// `Idle` with a user-facing alert and `Ok` is returned. `Err` only means
    /// the upload was refused because a submission is in flight.
    pub async fn upload<C>(&mut self, source: &C) -> Result<&WorkflowState, ApplicationError>
    where
        C: ContentSource + ?Sized,
    {
        if self.state.is_submitting() {
            return Err(self.reject(WorkflowTransitionError::LoadWhileSubmitting));
        }

        let descriptor = source.descriptor();
        if let Err(rejection) = screen_upload(descriptor, self.max_file_size_bytes) {
            warn!(
                event_name = "workflow.upload.rejected",
                correlation_id = %self.audit.correlation_id,
                file_name = %descriptor.name,
                size_bytes = descriptor.size_bytes,
                error = %rejection,
                "upload rejected before read"
            );
            self.dispatch(WorkflowEvent::UploadRejected { rejection })?;
            return Ok(&self.state);
        }

        let content = match source.read_text().await {
            Ok(content) => content,
            Err(error) => {
                warn!(
                    event_name = "workflow.upload.read_failed",
                    correlation_id = %self.audit.correlation_id,
                    file_name = %descriptor.name,
                    error = %error,
                    "could not read upload content"
                );
                self.dispatch(WorkflowEvent::LoadFailed { detail: error.to_string() })?;
                return Ok(&self.state);
            }
        };
        self.dispatch(WorkflowEvent::ContentLoaded { content })?;

        let summary = self.state.summary();
        info!(
            event_name = "workflow.upload.loaded",
            correlation_id = %self.audit.correlation_id,
            file_name = %descriptor.name,
            records_total = summary.total,
            records_valid = summary.valid,
            "upload processed"
        );
        Ok(&self.state)
    }

    /// Submits the current records.
    ///
    /// A submit with no records, or while one is already in flight, is a
    /// no-op: no gateway call and no state change. Gateway failure is
    /// recovered into a `Done` state carrying a generic failure outcome.
    pub async fn submit(&mut self) -> &WorkflowState {
        let outcome = match self.transition(WorkflowEvent::SubmitRequested) {
            Ok(outcome) => outcome,
            Err(error) => {
                debug!(
                    event_name = "workflow.submit.ignored",
                    correlation_id = %self.audit.correlation_id,
                    error = %error,
                    "submit request ignored"
                );
                return &self.state;
            }
        };
        self.state = outcome.to;

        let records = self.state.records().to_vec();
        info!(
            event_name = "workflow.submit.dispatched",
            correlation_id = %self.audit.correlation_id,
            records_total = records.len(),
            "submitting policy records"
        );

        let event = match self.gateway.submit(&records).await {
            Ok(receipt) => {
                info!(
                    event_name = "workflow.submit.succeeded",
                    correlation_id = %self.audit.correlation_id,
                    response_id = receipt.id,
                    "submission accepted"
                );
                WorkflowEvent::SubmissionSucceeded { receipt }
            }
            Err(error) => {
                warn!(
                    event_name = "workflow.submit.failed",
                    correlation_id = %self.audit.correlation_id,
                    error = %error,
                    "submission gateway failed"
                );
                WorkflowEvent::SubmissionFailed { detail: error.to_string() }
            }
        };

        self.resolve(event);
        &self.state
    }

    /// Clears records and alerts. Ignored while a submission is in flight.
    pub fn reset(&mut self) -> &WorkflowState {
        if let Ok(outcome) = self.transition(WorkflowEvent::ResetRequested) {
            self.state = outcome.to;
        }
        &self.state
    }

    fn transition(
        &self,
        event: WorkflowEvent,
    ) -> Result<TransitionOutcome, WorkflowTransitionError> {
        self.engine.apply_with_audit(&self.state, event, &self.sink, &self.audit)
    }

    /// Applies a gateway resolution. Only `Submitting` accepts one, so a
    /// rejection here means the state was replaced while the request ran.
    fn resolve(&mut self, event: WorkflowEvent) {
        match self.transition(event) {
            Ok(outcome) => self.state = outcome.to,
            Err(error) => warn!(
                event_name = "workflow.submit.resolution_rejected",
                correlation_id = %self.audit.correlation_id,
                state = self.state.kind().as_str(),
                error = %error,
                "submission resolution was not applied"
            ),
        }
    }

    fn dispatch(&mut self, event: WorkflowEvent) -> Result<(), ApplicationError> {
        let outcome = self.transition(event).map_err(|error| self.reject(error))?;
        self.state = outcome.to;
        Ok(())
    }

    fn reject(&self, error: WorkflowTransitionError) -> ApplicationError {
        warn!(
            event_name = "workflow.transition.rejected",
            correlation_id = %self.audit.correlation_id,
            state = self.state.kind().as_str(),
            error = %error,
            "workflow transition rejected"
        );
        ApplicationError::Domain(DomainError::WorkflowTransition(error))
    }
}
