pub mod check;
pub mod config;
pub mod submit;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use kinocr_core::audit::{AuditContext, TracingAuditSink};
use kinocr_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use kinocr_core::{ApplicationError, WorkflowController};
use serde::Serialize;

use crate::gateway::HttpSubmissionGateway;

pub type CliController = WorkflowController<HttpSubmissionGateway, TracingAuditSink>;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn plain(exit_code: u8, output: impl Into<String>) -> Self {
        Self { exit_code, output: output.into() }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    })
}

pub(crate) fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn load_options(config_path: Option<&Path>, overrides: ConfigOverrides) -> LoadOptions {
    LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        require_file: config_path.is_some(),
        overrides,
    }
}

pub(crate) fn load_config(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<AppConfig, ApplicationError> {
    Ok(AppConfig::load(load_options(config_path, overrides))?)
}

/// One controller per command invocation; it is the whole session.
pub(crate) fn build_controller(config: &AppConfig, command: &str) -> CliController {
    WorkflowController::new(
        HttpSubmissionGateway::from_config(&config.gateway),
        TracingAuditSink,
        AuditContext::new(correlation_id(command), format!("kinocr-{command}")),
    )
    .with_max_file_size(config.upload.max_file_size_bytes)
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build current-thread tokio runtime")
}

fn correlation_id(command: &str) -> String {
    format!("{command}-{}", std::process::id())
}
