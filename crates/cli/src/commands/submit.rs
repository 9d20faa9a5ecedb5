use std::path::Path;

use kinocr_core::config::ConfigOverrides;
use kinocr_core::{SubmissionOutcome, WorkflowState};

use crate::commands::{build_controller, load_config, runtime, CommandResult};
use crate::source::FsContentSource;

const COMMAND: &str = "submit";

pub fn run(path: &Path, config_path: Option<&Path>, endpoint: Option<String>) -> CommandResult {
    let overrides = ConfigOverrides { gateway_endpoint: endpoint, ..ConfigOverrides::default() };
    let config = match load_config(config_path, overrides) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(COMMAND, error.error_class(), error.to_string(), 4);
        }
    };

    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error:#}"),
                5,
            );
        }
    };

    let mut controller = build_controller(&config, COMMAND);
    let result = runtime.block_on(async {
        let source = FsContentSource::inspect(path).await;
        controller.upload(&source).await?;
        if controller.can_submit() {
            controller.submit().await;
        }
        Ok::<(), kinocr_core::ApplicationError>(())
    });
    if let Err(error) = result {
        return CommandResult::failure(COMMAND, error.error_class(), error.user_message(), 2);
    }

    report(controller.state())
}

fn report(state: &WorkflowState) -> CommandResult {
    let alert_message = state.alert().map(|alert| alert.message).unwrap_or_default();

    match state {
        WorkflowState::Done { outcome: SubmissionOutcome::Success { .. }, .. } => {
            CommandResult::success(COMMAND, alert_message)
        }
        WorkflowState::Done { outcome: SubmissionOutcome::Failure { .. }, .. } => {
            CommandResult::failure(COMMAND, "submission", alert_message, 3)
        }
        WorkflowState::Loaded { .. } => {
            CommandResult::failure(COMMAND, "no_policy_numbers", alert_message, 2)
        }
        WorkflowState::Idle { .. } | WorkflowState::Submitting { .. } => {
            CommandResult::failure(COMMAND, "upload_failed", alert_message, 2)
        }
    }
}
