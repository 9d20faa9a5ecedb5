use serde::{Deserialize, Serialize};

use crate::csv::UploadRejection;
use crate::domain::policy::{
    Alert, PolicyRecord, SubmissionOutcome, SubmissionReceipt, ValidationSummary,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    Idle { alert: Option<Alert> },
    Loaded { records: Vec<PolicyRecord>, alert: Option<Alert> },
    Submitting { records: Vec<PolicyRecord> },
    Done { records: Vec<PolicyRecord>, outcome: SubmissionOutcome },
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Idle { alert: None }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Idle,
    Loaded,
    Submitting,
    Done,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loaded => "loaded",
            Self::Submitting => "submitting",
            Self::Done => "done",
        }
    }
}

impl WorkflowState {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle { .. } => StateKind::Idle,
            Self::Loaded { .. } => StateKind::Loaded,
            Self::Submitting { .. } => StateKind::Submitting,
            Self::Done { .. } => StateKind::Done,
        }
    }

    pub fn records(&self) -> &[PolicyRecord] {
        match self {
            Self::Idle { .. } => &[],
            Self::Loaded { records, .. }
            | Self::Submitting { records }
            | Self::Done { records, .. } => records,
        }
    }

    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        match self {
            Self::Done { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// The message currently shown to the operator, if any.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            Self::Idle { alert } | Self::Loaded { alert, .. } => alert.clone(),
            Self::Submitting { .. } => None,
            Self::Done { outcome, .. } => Some(outcome_alert(outcome)),
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    pub fn has_loaded_file(&self) -> bool {
        !matches!(self, Self::Idle { .. })
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Loaded { .. } | Self::Done { .. }) && !self.records().is_empty()
    }

    pub fn can_reset(&self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.has_loaded_file() || !self.records().is_empty() || self.alert().is_some()
    }

    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary::from_records(self.records())
    }
}

pub fn outcome_alert(outcome: &SubmissionOutcome) -> Alert {
    match outcome {
        SubmissionOutcome::Success { id } => {
            Alert::success(format!("Policies submitted successfully. Response ID: {id}."))
        }
        SubmissionOutcome::Failure { reason } => Alert::error(reason.clone()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowEvent {
    ContentLoaded { content: String },
    LoadFailed { detail: String },
    UploadRejected { rejection: UploadRejection },
    SubmitRequested,
    SubmissionSucceeded { receipt: SubmissionReceipt },
    SubmissionFailed { detail: String },
    ResetRequested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ContentLoaded,
    LoadFailed,
    UploadRejected,
    SubmitRequested,
    SubmissionSucceeded,
    SubmissionFailed,
    ResetRequested,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentLoaded => "content_loaded",
            Self::LoadFailed => "load_failed",
            Self::UploadRejected => "upload_rejected",
            Self::SubmitRequested => "submit_requested",
            Self::SubmissionSucceeded => "submission_succeeded",
            Self::SubmissionFailed => "submission_failed",
            Self::ResetRequested => "reset_requested",
        }
    }
}

impl WorkflowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ContentLoaded { .. } => EventKind::ContentLoaded,
            Self::LoadFailed { .. } => EventKind::LoadFailed,
            Self::UploadRejected { .. } => EventKind::UploadRejected,
            Self::SubmitRequested => EventKind::SubmitRequested,
            Self::SubmissionSucceeded { .. } => EventKind::SubmissionSucceeded,
            Self::SubmissionFailed { .. } => EventKind::SubmissionFailed,
            Self::ResetRequested => EventKind::ResetRequested,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowAction {
    /// Hand the current records to the submission gateway.
    DispatchSubmission,
    /// Forget the selected upload so the same file can be picked again.
    ClearUploadSelection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: StateKind,
    pub to: WorkflowState,
    pub event: EventKind,
    pub actions: Vec<WorkflowAction>,
}
