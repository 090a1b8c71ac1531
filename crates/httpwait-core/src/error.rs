use thiserror::Error;

use crate::extract::FieldPath;

/// Malformed input detected while building a [`crate::PollRequest`].
///
/// Always fatal: polling never starts when one of these is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("url is required")]
    MissingUrl,
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
    #[error("expected status {0} is not a valid HTTP status code")]
    InvalidStatus(u16),
    #[error("headers must be a JSON object of string values: {0}")]
    InvalidHeaders(String),
    #[error("invalid header name {0:?}")]
    InvalidHeaderName(String),
    #[error("header {0:?} has a value that is not valid in an HTTP header")]
    InvalidHeaderValue(String),
    #[error("auth and digest-auth are mutually exclusive")]
    ConflictingCredentials,
    #[error("expected-response-field-value requires expected-response-field to be set")]
    ValueWithoutField,
    #[error("field path {path:?} contains an empty segment")]
    EmptyPathSegment { path: String },
    #[error("{name} must be a positive number of seconds")]
    NonPositive { name: &'static str },
    #[error("{name} must be an integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be one of {expected}, got {value:?}")]
    InvalidChoice {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to load {path}: {reason}")]
    ConfigFile { path: String, reason: String },
}

/// Failure reported by a transport before any response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Why a single attempt did not satisfy the expectation. Every variant is
/// retry eligible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("wrong status {got}, expected {want}")]
    StatusMismatch { got: u16, want: u16 },
    #[error("response body is not JSON: {reason}")]
    BodyNotJson { reason: String },
    #[error("property \"{path}\" does not exist")]
    FieldMissing { path: FieldPath },
    #[error("property \"{path}\" is \"{got}\" instead of \"{want}\"")]
    FieldValueMismatch {
        path: FieldPath,
        got: String,
        want: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal failure of a poll loop invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    /// The deadline passed after a failed attempt. Reports the configured
    /// timeout, not the measured elapsed time.
    #[error("Timeout after {timeout_secs} seconds.")]
    Timeout {
        timeout_secs: u64,
        #[source]
        last_failure: AttemptFailure,
    },
    /// External cancellation was observed at a suspension point.
    #[error("polling cancelled")]
    Cancelled { last_failure: Option<AttemptFailure> },
}

impl PollError {
    /// The most recent attempt failure, if any attempt completed.
    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::Timeout { last_failure, .. } => Some(last_failure),
            Self::Cancelled { last_failure } => last_failure.as_ref(),
        }
    }
}
