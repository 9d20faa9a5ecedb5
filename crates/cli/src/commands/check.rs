use kinocr_core::{diagnose_policy_number, PolicyCheck};
use serde::Serialize;

use crate::commands::{escape_json, CommandResult};

#[derive(Debug, Serialize)]
struct CheckLine<'a> {
    policy_number: &'a str,
    result: PolicyCheck,
}

/// Exit code is 0 only when every number passes.
pub fn run(numbers: &[String], json_output: bool) -> CommandResult {
    let lines: Vec<CheckLine<'_>> = numbers
        .iter()
        .map(|number| CheckLine { policy_number: number, result: diagnose_policy_number(number) })
        .collect();
    let all_valid = lines.iter().all(|line| line.result == PolicyCheck::Valid);
    let exit_code = if all_valid { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&lines).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"check\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        lines
            .iter()
            .map(|line| format!("{}: {}", line.policy_number, line.result.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandResult::plain(exit_code, output)
}
