use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::csv::MAX_FILE_SIZE_BYTES;

pub const DEFAULT_GATEWAY_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["kinocr.toml", "config/kinocr.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub upload: UploadConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub api_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub max_file_size_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_endpoint: Option<String>,
    pub gateway_api_token: Option<String>,
    pub max_file_size_bytes: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig { endpoint: DEFAULT_GATEWAY_ENDPOINT.to_string(), api_token: None },
            upload: UploadConfig { max_file_size_bytes: MAX_FILE_SIZE_BYTES },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Precedence, lowest first: defaults, file, `KINOCR_*` env, overrides.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(endpoint) = gateway.endpoint {
                self.gateway.endpoint = endpoint;
            }
            if let Some(api_token) = gateway.api_token {
                self.gateway.api_token = Some(api_token.into());
            }
        }

        if let Some(upload) = patch.upload {
            if let Some(max_file_size_bytes) = upload.max_file_size_bytes {
                self.upload.max_file_size_bytes = max_file_size_bytes;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("KINOCR_GATEWAY_ENDPOINT") {
            self.gateway.endpoint = value;
        }
        if let Some(value) = read_env("KINOCR_GATEWAY_API_TOKEN") {
            self.gateway.api_token = Some(value.into());
        }

        if let Some(value) = read_env("KINOCR_UPLOAD_MAX_FILE_SIZE_BYTES") {
            self.upload.max_file_size_bytes =
                parse_u64("KINOCR_UPLOAD_MAX_FILE_SIZE_BYTES", &value)?;
        }

        let log_level = read_env("KINOCR_LOGGING_LEVEL").or_else(|| read_env("KINOCR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("KINOCR_LOGGING_FORMAT").or_else(|| read_env("KINOCR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(endpoint) = overrides.gateway_endpoint {
            self.gateway.endpoint = endpoint;
        }
        if let Some(api_token) = overrides.gateway_api_token {
            self.gateway.api_token = Some(api_token.into());
        }
        if let Some(max_file_size_bytes) = overrides.max_file_size_bytes {
            self.upload.max_file_size_bytes = max_file_size_bytes;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_upload(&self.upload)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let endpoint = gateway.endpoint.trim();
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.endpoint must start with http:// or https://".to_string(),
        ));
    }

    if let Some(token) = &gateway.api_token {
        if token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.api_token must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_upload(upload: &UploadConfig) -> Result<(), ConfigError> {
    if upload.max_file_size_bytes == 0 {
        return Err(ConfigError::Validation(
            "upload.max_file_size_bytes must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    upload: Option<UploadPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    endpoint: Option<String>,
    api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UploadPatch {
    max_file_size_bytes: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
