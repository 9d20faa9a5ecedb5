use std::path::Path;

use kinocr_core::config::ConfigOverrides;
use kinocr_core::{Alert, AlertLevel, PolicyRecord, ValidationSummary};
use serde::Serialize;

use crate::commands::{build_controller, escape_json, load_config, runtime, CommandResult};
use crate::source::FsContentSource;

const COMMAND: &str = "validate";
const NUMBER_HEADER: &str = "policy number";

#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    command: &'static str,
    file: String,
    state: &'static str,
    records: &'a [PolicyRecord],
    summary: ValidationSummary,
    alert: Option<Alert>,
}

pub fn run(path: &Path, config_path: Option<&Path>, json_output: bool) -> CommandResult {
    let config = match load_config(config_path, ConfigOverrides::default()) {
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
    let uploaded = runtime.block_on(async {
        let source = FsContentSource::inspect(path).await;
        controller.upload(&source).await.map(|_| ())
    });
    if let Err(error) = uploaded {
        return CommandResult::failure(COMMAND, error.error_class(), error.user_message(), 2);
    }

    let state = controller.state();
    let report = ValidationReport {
        command: COMMAND,
        file: path.display().to_string(),
        state: state.kind().as_str(),
        records: state.records(),
        summary: state.summary(),
        alert: state.alert(),
    };
    let exit_code = if report.records.is_empty() { 2 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"{COMMAND}\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult::plain(exit_code, output)
}

fn render_human(report: &ValidationReport<'_>) -> String {
    let mut lines = Vec::new();

    if !report.records.is_empty() {
        let width = report
            .records
            .iter()
            .map(|record| record.policy_number.len())
            .chain(std::iter::once(NUMBER_HEADER.len()))
            .max()
            .unwrap_or(NUMBER_HEADER.len());

        lines.push(format!("{NUMBER_HEADER:<width$}  status"));
        for record in report.records {
            let status = if record.is_valid { "valid" } else { "invalid" };
            lines.push(format!("{:<width$}  {status}", record.policy_number));
        }
        lines.push(format!(
            "{} policy numbers: {} valid, {} invalid",
            report.summary.total, report.summary.valid, report.summary.invalid
        ));
    }

    if let Some(alert) = &report.alert {
        let marker = match alert.level {
            AlertLevel::Success => "ok",
            AlertLevel::Error => "error",
        };
        lines.push(format!("{marker}: {}", alert.message));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use kinocr_core::{get_policy_validation, Alert, PolicyRecord, ValidationSummary};

    use super::{render_human, ValidationReport};

    fn report<'a>(records: &'a [PolicyRecord], alert: Option<Alert>) -> ValidationReport<'a> {
        ValidationReport {
            command: "validate",
            file: "policies.csv".to_owned(),
            state: "loaded",
            records,
            summary: ValidationSummary::from_records(records),
            alert,
        }
    }

    #[test]
    fn renders_table_with_summary() {
        let records: Vec<PolicyRecord> =
            ["345882865", "664371495"].iter().map(|n| get_policy_validation(n)).collect();
        let output = render_human(&report(&records, None));

        assert_eq!(
            output,
            "policy number  status\n\
             345882865      valid\n\
             664371495      invalid\n\
             2 policy numbers: 1 valid, 1 invalid"
        );
    }

    #[test]
    fn renders_alert_when_no_records() {
        let output = render_human(&report(
            &[],
            Some(Alert::error("No policy numbers were found in the CSV file.")),
        ));
        assert_eq!(output, "error: No policy numbers were found in the CSV file.");
    }
}
