//! Policy-number intake: checksum and CSV rules plus the workflow state
//! machine that sequences uploads and submissions.
//!
//! The HTTP transport and upload reading live behind the traits in
//! [`gateway`]; implementations are supplied by the binary.

pub mod audit;
pub mod checksum;
pub mod config;
pub mod csv;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod workflow;

pub use checksum::{
    diagnose_policy_number, get_policy_validation, is_valid_policy_number, PolicyCheck,
};
pub use csv::{
    is_csv_file, is_within_max_file_size, parse_policy_numbers_from_csv, UploadFile,
    UploadRejection,
};
pub use domain::policy::{
    Alert, AlertLevel, PolicyRecord, SubmissionOutcome, SubmissionReceipt, ValidationSummary,
};
pub use errors::{ApplicationError, DomainError};
pub use gateway::{
    ContentReadError, ContentSource, GatewayError, StaticContentSource, SubmissionGateway,
};
pub use workflow::{WorkflowController, WorkflowEngine, WorkflowEvent, WorkflowState};
