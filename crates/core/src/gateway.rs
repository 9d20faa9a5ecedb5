//! Seams to the two asynchronous collaborators of the workflow: where upload
//! text comes from and where validated records go.

use async_trait::async_trait;
use thiserror::Error;

use crate::csv::UploadFile;
use crate::domain::policy::{PolicyRecord, SubmissionReceipt};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("submission request failed: {0}")]
    Transport(String),
    #[error("submission endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode submission response: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContentReadError {
    #[error("could not read upload: {0}")]
    Io(String),
}

#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Sends the full record list, invalid entries included.
    async fn submit(&self, records: &[PolicyRecord]) -> Result<SubmissionReceipt, GatewayError>;
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    fn descriptor(&self) -> &UploadFile;
    async fn read_text(&self) -> Result<String, ContentReadError>;
}

/// In-memory upload, used where content is already at hand.
#[derive(Clone, Debug)]
pub struct StaticContentSource {
    descriptor: UploadFile,
    content: Result<String, ContentReadError>,
}

impl StaticContentSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            descriptor: UploadFile::new(
                name,
                Some(crate::csv::CSV_MEDIA_TYPE.to_owned()),
                content.len() as u64,
            ),
            content: Ok(content),
        }
    }

    pub fn failing(descriptor: UploadFile, error: ContentReadError) -> Self {
        Self { descriptor, content: Err(error) }
    }

    pub fn with_descriptor(mut self, descriptor: UploadFile) -> Self {
        self.descriptor = descriptor;
        self
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    fn descriptor(&self) -> &UploadFile {
        &self.descriptor
    }

    async fn read_text(&self) -> Result<String, ContentReadError> {
        self.content.clone()
    }
}
