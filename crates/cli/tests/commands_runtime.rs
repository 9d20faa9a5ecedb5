use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use kinocr_cli::commands::{check, config, submit, validate};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn validate_reports_records_and_summary() {
    with_env(&[], || {
        let (_dir, path) = write_csv("policies.csv", "345882865,664371495\n457508000\r\n");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 0, "expected successful validation");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "validate");
        assert_eq!(payload["state"], "loaded");
        assert_eq!(payload["records"][0]["policyNumber"], "345882865");
        assert_eq!(payload["records"][0]["isValid"], true);
        assert_eq!(payload["records"][1]["isValid"], false);
        assert_eq!(payload["summary"]["total"], 3);
        assert_eq!(payload["summary"]["valid"], 2);
        assert_eq!(payload["summary"]["invalid"], 1);
        assert_eq!(payload["alert"], Value::Null);
    });
}

#[test]
fn validate_reads_excel_export_with_bom_and_latin1_header() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("export.csv");
        let mut bytes = b"\xef\xbb\xbf345882865,P\xf3liza\r\n".to_vec();
        bytes.extend_from_slice(b"664371495\r\n");
        fs::write(&path, bytes).expect("write csv");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["records"][0]["policyNumber"], "345882865");
        assert_eq!(payload["records"][0]["isValid"], true);
        assert_eq!(payload["records"][1]["policyNumber"], "664371495");
        assert_eq!(payload["summary"]["total"], 2);
        assert_eq!(payload["alert"], Value::Null);
    });
}

#[test]
fn validate_without_policy_numbers_exits_with_message() {
    with_env(&[], || {
        let (_dir, path) = write_csv("empty.csv", "name,notes\nalice,n/a\n");

        let result = validate::run(&path, None, false);
        assert_eq!(result.exit_code, 2);
        assert_eq!(last_line(&result.output), "error: No policy numbers were found in the CSV file.");
    });
}

#[test]
fn validate_rejects_non_csv_upload() {
    with_env(&[], || {
        let (_dir, path) = write_csv("policies.txt", "345882865\n");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["state"], "idle");
        assert_eq!(payload["alert"]["message"], "Please upload a valid CSV file.");
    });
}

#[test]
fn validate_rejects_oversized_upload_using_configured_limit() {
    with_env(&[("KINOCR_UPLOAD_MAX_FILE_SIZE_BYTES", "8")], || {
        let (_dir, path) = write_csv("policies.csv", "345882865,457508000\n");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["state"], "idle");
        assert!(payload["records"].as_array().is_some_and(Vec::is_empty));
    });
}

#[test]
fn validate_missing_file_reports_read_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("absent.csv");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["alert"]["level"], "error");
        assert_eq!(payload["alert"]["message"], "Unable to read the CSV file. Please try again.");
    });
}

#[test]
fn validate_returns_config_failure_for_bad_endpoint() {
    with_env(&[("KINOCR_GATEWAY_ENDPOINT", "ftp://intake.example.test")], || {
        let (_dir, path) = write_csv("policies.csv", "345882865\n");

        let result = validate::run(&path, None, true);
        assert_eq!(result.exit_code, 4, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("config validation failed: "));
        assert!(message.contains("gateway.endpoint"));
    });
}

#[test]
fn validate_requires_explicit_config_file_to_exist() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let (_csv_dir, path) = write_csv("policies.csv", "345882865\n");
        let missing = dir.path().join("kinocr.toml");

        let result = validate::run(&path, Some(&missing), true);
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
    });
}

#[test]
fn submit_to_unreachable_endpoint_reports_generic_failure() {
    with_env(&[], || {
        let (_dir, path) = write_csv("policies.csv", "345882865\n");
        let endpoint = closed_endpoint();

        let result = submit::run(&path, None, Some(endpoint));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "submit");
        assert_eq!(payload["error_class"], "submission");
        assert_eq!(payload["message"], "Submission failed. Please try again.");
    });
}

#[test]
fn submit_without_policy_numbers_does_not_dispatch() {
    with_env(&[], || {
        let (_dir, path) = write_csv("empty.csv", "\n\n");

        let result = submit::run(&path, None, Some(closed_endpoint()));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "no_policy_numbers");
        assert_eq!(payload["message"], "No policy numbers were found in the CSV file.");
    });
}

#[test]
fn submit_with_unreadable_file_reports_upload_failure() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");

        let result = submit::run(&dir.path().join("absent.csv"), None, Some(closed_endpoint()));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "upload_failed");
        assert_eq!(payload["message"], "Unable to read the CSV file. Please try again.");
    });
}

#[test]
fn check_diagnoses_each_number() {
    let numbers = vec!["345882865".to_string(), "34588286".to_string()];
    let result = check::run(&numbers, true);
    assert_eq!(result.exit_code, 1);

    let payload = parse_payload(&result.output);
    assert_eq!(payload[0]["result"], "valid");
    assert_eq!(payload[1]["result"], "malformed");
}

#[test]
fn config_reports_sources_with_redaction() {
    with_env(
        &[("KINOCR_GATEWAY_API_TOKEN", "intake-secret"), ("KINOCR_LOG_LEVEL", "debug")],
        || {
            let dir = TempDir::new().expect("temp dir");
            let config_path = dir.path().join("kinocr.toml");
            fs::write(&config_path, "[upload]\nmax_file_size_bytes = 4096\n")
                .expect("write config");

            let result = config::run(Some(&config_path));
            assert_eq!(result.exit_code, 0);
            assert!(!result.output.contains("intake-secret"));
            assert!(result.output.contains(
                "- gateway.endpoint = https://jsonplaceholder.typicode.com/posts (source: default)"
            ));
            assert!(result.output.contains(
                "- gateway.api_token = <redacted> (source: env (KINOCR_GATEWAY_API_TOKEN))"
            ));
            assert!(result.output.contains(&format!(
                "- upload.max_file_size_bytes = 4096 (source: file ({}))",
                config_path.display()
            )));
            assert!(result
                .output
                .contains("- logging.level = debug (source: env (KINOCR_LOG_LEVEL))"));
            assert!(result.output.contains("- logging.format = compact (source: default)"));
        },
    );
}

fn write_csv(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write csv");
    (dir, path)
}

fn closed_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{address}/posts")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "KINOCR_GATEWAY_ENDPOINT",
        "KINOCR_GATEWAY_API_TOKEN",
        "KINOCR_UPLOAD_MAX_FILE_SIZE_BYTES",
        "KINOCR_LOGGING_LEVEL",
        "KINOCR_LOGGING_FORMAT",
        "KINOCR_LOG_LEVEL",
        "KINOCR_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
