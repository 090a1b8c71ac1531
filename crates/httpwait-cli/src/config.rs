use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use serde_json::Value;

use httpwait_core::request::{
    DEFAULT_EXPECTED_STATUS, DEFAULT_INTERVAL_SECS, DEFAULT_METHOD, DEFAULT_TIMEOUT_SECS,
};
use httpwait_core::{ConfigError, Credentials, PollRequest, render};
use httpwait_reqwest::TransportConfig;
use httpwait_reqwest::transport::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "httpwait.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        <Self as ValueEnum>::from_str(raw.trim(), true).map_err(|_| ConfigError::InvalidChoice {
            name: "log-format",
            value: raw.to_string(),
            expected: "text, json",
        })
    }
}

/// Command-line flags. Each input also reads the `INPUT_*` variable GitHub
/// Actions sets for it; flags win over the environment.
#[derive(Debug, Default, Parser)]
#[command(
    name = "httpwait",
    version,
    about = "Wait until an HTTP endpoint returns the expected response"
)]
pub struct Cli {
    /// TOML settings file (defaults to ./httpwait.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Endpoint to poll
    #[arg(long, env = "INPUT_URL")]
    pub url: Option<String>,

    /// HTTP method [default: GET]
    #[arg(long, env = "INPUT_METHOD")]
    pub method: Option<String>,

    /// Request headers as a JSON object, e.g. '{"Accept":"application/json"}'
    #[arg(long, env = "INPUT_HEADERS", value_name = "JSON")]
    pub headers: Option<String>,

    /// Basic credentials as user:password
    #[arg(long, env = "INPUT_AUTH", hide_env_values = true)]
    pub auth: Option<String>,

    /// Digest credentials as user:password
    #[arg(long, env = "INPUT_DIGEST-AUTH", hide_env_values = true)]
    pub digest_auth: Option<String>,

    /// Overall deadline in seconds [default: 300]
    #[arg(long, env = "INPUT_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<String>,

    /// Delay between attempts in seconds [default: 1]
    #[arg(long, env = "INPUT_INTERVAL", value_name = "SECS")]
    pub interval: Option<String>,

    /// Status code that counts as ready [default: 200]
    #[arg(long, env = "INPUT_EXPECTED-STATUS", value_name = "CODE")]
    pub expected_status: Option<String>,

    /// Dotted path of a JSON field that must be present, e.g. user.name
    #[arg(long, env = "INPUT_EXPECTED-RESPONSE-FIELD", value_name = "PATH")]
    pub expected_response_field: Option<String>,

    /// Value the field must have, compared as text
    #[arg(long, env = "INPUT_EXPECTED-RESPONSE-FIELD-VALUE", value_name = "VALUE")]
    pub expected_response_field_value: Option<String>,

    /// Per-attempt request timeout in seconds [default: 10]
    #[arg(long, env = "INPUT_REQUEST-TIMEOUT", value_name = "SECS")]
    pub request_timeout: Option<String>,

    /// Log output format: text or json [default: text]
    #[arg(long, env = "INPUT_LOG-FORMAT", value_name = "FORMAT")]
    pub log_format: Option<String>,
}

/// Resolved settings: defaults, then the TOML file, then flags/env.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub url: Option<String>,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub auth: Option<String>,
    pub digest_auth: Option<String>,
    pub timeout: u64,
    pub interval: u64,
    pub expected_status: u16,
    pub expected_response_field: Option<String>,
    pub expected_response_field_value: Option<String>,
    pub request_timeout: u64,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            method: DEFAULT_METHOD.to_string(),
            headers: BTreeMap::new(),
            auth: None,
            digest_auth: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            interval: DEFAULT_INTERVAL_SECS,
            expected_status: DEFAULT_EXPECTED_STATUS,
            expected_response_field: None,
            expected_response_field_value: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Load the settings file named by `cli` (or `httpwait.toml` if it
    /// exists), then layer the flags on top.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut settings = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            },
            None => Self::default(),
        };
        settings.apply(cli)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file_error = |reason: String| ConfigError::ConfigFile {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| file_error(e.message().to_string()))
    }

    /// Override fields with every non-empty flag. GitHub Actions passes
    /// unset inputs as empty strings, so those are skipped.
    pub fn apply(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(url) = non_empty(&cli.url) {
            self.url = Some(url.to_string());
        }
        if let Some(method) = non_empty(&cli.method) {
            self.method = method.to_string();
        }
        if let Some(raw) = non_empty(&cli.headers) {
            self.headers.extend(parse_headers(raw)?);
        }
        if let Some(auth) = non_empty(&cli.auth) {
            self.auth = Some(auth.to_string());
        }
        if let Some(auth) = non_empty(&cli.digest_auth) {
            self.digest_auth = Some(auth.to_string());
        }
        if let Some(raw) = non_empty(&cli.timeout) {
            self.timeout = parse_number("timeout", raw)?;
        }
        if let Some(raw) = non_empty(&cli.interval) {
            self.interval = parse_number("interval", raw)?;
        }
        if let Some(raw) = non_empty(&cli.expected_status) {
            self.expected_status = parse_number("expected-status", raw)?;
        }
        if let Some(field) = non_empty(&cli.expected_response_field) {
            self.expected_response_field = Some(field.to_string());
        }
        if let Some(value) = non_empty(&cli.expected_response_field_value) {
            self.expected_response_field_value = Some(value.to_string());
        }
        if let Some(raw) = non_empty(&cli.request_timeout) {
            self.request_timeout = parse_number("request-timeout", raw)?;
        }
        if let Some(raw) = non_empty(&cli.log_format) {
            self.log_format = LogFormat::parse(raw)?;
        }
        Ok(())
    }

    pub fn credentials(&self) -> Result<Option<Credentials>, ConfigError> {
        match (non_empty(&self.auth), non_empty(&self.digest_auth)) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingCredentials),
            (Some(basic), None) => Ok(Some(Credentials::Basic(basic.to_string()))),
            (None, Some(digest)) => Ok(Some(Credentials::Digest(digest.to_string()))),
            (None, None) => Ok(None),
        }
    }

    pub fn to_request(&self) -> Result<PollRequest, ConfigError> {
        let url = non_empty(&self.url).ok_or(ConfigError::MissingUrl)?;
        let mut builder = PollRequest::builder(url)
            .method(&self.method)
            .headers(self.headers.clone())
            .credentials(self.credentials()?)
            .expected_status(self.expected_status)
            .timeout_secs(self.timeout)
            .interval_secs(self.interval);
        if let Some(field) = non_empty(&self.expected_response_field) {
            builder = builder.expected_field(field);
        }
        if let Some(value) = non_empty(&self.expected_response_field_value) {
            builder = builder.expected_value(value);
        }
        builder.build()
    }

    pub fn transport_config(&self) -> Result<TransportConfig, ConfigError> {
        if self.request_timeout == 0 {
            return Err(ConfigError::NonPositive {
                name: "request-timeout",
            });
        }
        Ok(TransportConfig {
            request_timeout: Duration::from_secs(self.request_timeout),
            ..TransportConfig::default()
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_number<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

/// Parse a JSON object of headers. Numbers and booleans are accepted and
/// rendered as text; anything else is rejected.
pub fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidHeaders(e.to_string()))?;
    let Value::Object(map) = parsed else {
        return Err(ConfigError::InvalidHeaders("expected a JSON object".to_string()));
    };
    map.into_iter()
        .map(|(name, value)| match &value {
            Value::String(s) => Ok((name, s.clone())),
            Value::Number(_) | Value::Bool(_) => Ok((name, render(&value).into_owned())),
            _ => Err(ConfigError::InvalidHeaders(format!(
                "header {name:?} must be a string"
            ))),
        })
        .collect()
}
