use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::checksum::get_policy_validation;
use crate::csv::parse_policy_numbers_from_csv;
use crate::domain::policy::{Alert, PolicyRecord, SubmissionOutcome};
use crate::errors::{NO_POLICY_NUMBERS_MESSAGE, READ_FAILURE_MESSAGE, SUBMISSION_FAILURE_MESSAGE};
use crate::workflow::states::{
    EventKind, StateKind, TransitionOutcome, WorkflowAction, WorkflowEvent, WorkflowState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitBlockReason {
    NoRecords,
    InFlight,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowTransitionError {
    #[error("submit blocked: {reason:?}")]
    SubmitBlocked { reason: SubmitBlockReason },
    #[error("a new upload cannot start while a submission is in flight")]
    LoadWhileSubmitting,
    #[error("reset is unavailable while a submission is in flight")]
    ResetWhileSubmitting,
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: StateKind, event: EventKind },
}

impl WorkflowTransitionError {
    /// Guard rejections are expected UI no-ops rather than faults.
    pub fn is_guard(&self) -> bool {
        !matches!(self, Self::InvalidTransition { .. })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WorkflowEngine;

impl WorkflowEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_state(&self) -> WorkflowState {
        WorkflowState::default()
    }

    pub fn apply(
        &self,
        current: &WorkflowState,
        event: WorkflowEvent,
    ) -> Result<TransitionOutcome, WorkflowTransitionError> {
        transition(current, event)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &WorkflowState,
        event: WorkflowEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, WorkflowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let kind = event.kind();
        let detail = event_detail(&event);
        let result = self.apply(current, event);

        match &result {
            Ok(outcome) => {
                let audit_outcome = match kind {
                    EventKind::LoadFailed | EventKind::UploadRejected | EventKind::SubmissionFailed => {
                        AuditOutcome::Failed
                    }
                    _ => AuditOutcome::Success,
                };
                let summary = outcome.to.summary();
                let mut event = AuditEvent::new(
                    audit,
                    "workflow.transition_applied",
                    category_for(kind),
                    audit_outcome,
                )
                .with_metadata("from", outcome.from.as_str())
                .with_metadata("to", outcome.to.kind().as_str())
                .with_metadata("event", kind.as_str())
                .with_metadata("records_total", summary.total.to_string())
                .with_metadata("records_valid", summary.valid.to_string());
                if let Some(detail) = detail {
                    event = event.with_metadata("detail", detail);
                }
                sink.emit(event);
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "workflow.transition_rejected",
                        category_for(kind),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("from", current.kind().as_str())
                    .with_metadata("event", kind.as_str())
                    .with_metadata("error", error.to_string()),
                );
            }
        }

        result
    }
}

fn category_for(kind: EventKind) -> AuditCategory {
    match kind {
        EventKind::ContentLoaded => AuditCategory::Validation,
        EventKind::LoadFailed | EventKind::UploadRejected => AuditCategory::Upload,
        EventKind::SubmitRequested | EventKind::SubmissionSucceeded | EventKind::SubmissionFailed => {
            AuditCategory::Submission
        }
        EventKind::ResetRequested => AuditCategory::Workflow,
    }
}

fn event_detail(event: &WorkflowEvent) -> Option<String> {
    match event {
        WorkflowEvent::LoadFailed { detail } | WorkflowEvent::SubmissionFailed { detail } => {
            Some(detail.clone())
        }
        WorkflowEvent::UploadRejected { rejection } => Some(rejection.to_string()),
        WorkflowEvent::SubmissionSucceeded { receipt } => Some(format!("id={}", receipt.id)),
        _ => None,
    }
}

fn load_records(content: &str) -> WorkflowState {
    let records: Vec<PolicyRecord> = parse_policy_numbers_from_csv(content)
        .iter()
        .map(|token| get_policy_validation(token))
        .collect();
    let alert = records.is_empty().then(|| Alert::error(NO_POLICY_NUMBERS_MESSAGE));

    WorkflowState::Loaded { records, alert }
}

fn transition(
    current: &WorkflowState,
    event: WorkflowEvent,
) -> Result<TransitionOutcome, WorkflowTransitionError> {
    use WorkflowAction::{ClearUploadSelection, DispatchSubmission};
    use WorkflowEvent::{
        ContentLoaded, LoadFailed, ResetRequested, SubmissionFailed, SubmissionSucceeded,
        SubmitRequested, UploadRejected,
    };
    use WorkflowState::{Done, Idle, Loaded, Submitting};

    let from = current.kind();
    let event_kind = event.kind();

    let (to, actions) = match (current, event) {
        (Submitting { .. }, ContentLoaded { .. } | LoadFailed { .. } | UploadRejected { .. }) => {
            return Err(WorkflowTransitionError::LoadWhileSubmitting);
        }
        (_, ContentLoaded { content }) => (load_records(&content), Vec::new()),
        (_, LoadFailed { .. }) => (Idle { alert: Some(Alert::error(READ_FAILURE_MESSAGE)) }, Vec::new()),
        (_, UploadRejected { rejection }) => (
            Idle { alert: Some(Alert::error(rejection.user_message())) },
            vec![ClearUploadSelection],
        ),
        (Submitting { .. }, SubmitRequested) => {
            return Err(WorkflowTransitionError::SubmitBlocked {
                reason: SubmitBlockReason::InFlight,
            });
        }
        (Loaded { records, .. } | Done { records, .. }, SubmitRequested) if !records.is_empty() => {
            (Submitting { records: records.clone() }, vec![DispatchSubmission])
        }
        (_, SubmitRequested) => {
            return Err(WorkflowTransitionError::SubmitBlocked {
                reason: SubmitBlockReason::NoRecords,
            });
        }
        (Submitting { records }, SubmissionSucceeded { receipt }) => (
            Done { records: records.clone(), outcome: SubmissionOutcome::Success { id: receipt.id } },
            Vec::new(),
        ),
        (Submitting { records }, SubmissionFailed { .. }) => (
            Done {
                records: records.clone(),
                outcome: SubmissionOutcome::Failure {
                    reason: SUBMISSION_FAILURE_MESSAGE.to_owned(),
                },
            },
            Vec::new(),
        ),
        (Submitting { .. }, ResetRequested) => {
            return Err(WorkflowTransitionError::ResetWhileSubmitting);
        }
        (_, ResetRequested) => (Idle { alert: None }, vec![ClearUploadSelection]),
        (_, SubmissionSucceeded { .. } | SubmissionFailed { .. }) => {
            return Err(WorkflowTransitionError::InvalidTransition { state: from, event: event_kind });
        }
    };

    Ok(TransitionOutcome { from, to, event: event_kind, actions })
}
