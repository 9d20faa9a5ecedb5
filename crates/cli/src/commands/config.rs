use std::env;
use std::fs;
use std::path::Path;

use kinocr_core::config::{resolve_config_path, AppConfig, ConfigOverrides, LogFormat};
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Field<'a> {
    key_path: &'a str,
    env_keys: &'a [&'a str],
    value: String,
}

pub fn run(config_path: Option<&Path>) -> CommandResult {
    let config = match load_config(config_path, ConfigOverrides::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::plain(4, error.to_string());
        }
    };

    let file_path = resolve_config_path(config_path);
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(&field, file_doc.as_ref(), file_path.as_deref());
        lines.push(render_line(field.key_path, &field.value, &source));
    }

    CommandResult::plain(0, lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field<'static>> {
    let api_token = if config.gateway.api_token.is_some() { "<redacted>" } else { "<unset>" };
    let log_format = match config.logging.format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    };

    vec![
        Field {
            key_path: "gateway.endpoint",
            env_keys: &["KINOCR_GATEWAY_ENDPOINT"],
            value: config.gateway.endpoint.clone(),
        },
        Field {
            key_path: "gateway.api_token",
            env_keys: &["KINOCR_GATEWAY_API_TOKEN"],
            value: api_token.to_string(),
        },
        Field {
            key_path: "upload.max_file_size_bytes",
            env_keys: &["KINOCR_UPLOAD_MAX_FILE_SIZE_BYTES"],
            value: config.upload.max_file_size_bytes.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["KINOCR_LOGGING_LEVEL", "KINOCR_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["KINOCR_LOGGING_FORMAT", "KINOCR_LOG_FORMAT"],
            value: log_format.to_string(),
        },
    ]
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field<'_>, file_doc: Option<&Value>, file_path: Option<&Path>) -> String {
    if let Some(env_key) = field
        .env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file_doc {
        if contains_path(doc, field.key_path) {
            let file_path = file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: &str) -> String {
    format!("- {key} = {value} (source: {source})")
}
