use thiserror::Error;

use httpwait_core::{ConfigError, PollError, TransportError};

pub const EXIT_TIMEOUT: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
/// 128 + SIGINT, as a shell reports an interrupted job.
pub const EXIT_CANCELLED: u8 = 130;

/// Everything that can end a run without success.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Setup(#[from] TransportError),
    #[error(transparent)]
    Poll(#[from] PollError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Setup(_) | Self::Poll(PollError::Timeout { .. }) => EXIT_TIMEOUT,
            Self::Poll(PollError::Cancelled { .. }) => EXIT_CANCELLED,
        }
    }

    /// One-line summary for the job log, including the last attempt
    /// failure when there was one.
    pub fn summary(&self) -> String {
        match self {
            Self::Poll(err) => match err.last_failure() {
                Some(last) => format!("{err} (last failure: {last})"),
                None => err.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Poll errors are already logged by the poll observer.
    pub fn already_logged(&self) -> bool {
        matches!(self, Self::Poll(_))
    }
}

#[cfg(test)]
mod tests {
    use httpwait_core::AttemptFailure;

    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(AppError::from(ConfigError::MissingUrl).exit_code(), 2);
        assert_eq!(
            AppError::from(TransportError::new("no tls backend")).exit_code(),
            1
        );
        let timeout = PollError::Timeout {
            timeout_secs: 5,
            last_failure: AttemptFailure::StatusMismatch { got: 400, want: 200 },
        };
        assert_eq!(AppError::from(timeout).exit_code(), 1);
        let cancelled = PollError::Cancelled { last_failure: None };
        assert_eq!(AppError::from(cancelled).exit_code(), 130);
    }

    #[test]
    fn timeout_summary_names_last_failure() {
        let err = AppError::from(PollError::Timeout {
            timeout_secs: 5,
            last_failure: AttemptFailure::StatusMismatch { got: 400, want: 200 },
        });
        assert_eq!(
            err.summary(),
            "Timeout after 5 seconds. (last failure: wrong status 400, expected 200)"
        );
    }

    #[test]
    fn config_summary() {
        let err = AppError::from(ConfigError::ConflictingCredentials);
        assert!(err.summary().starts_with("invalid configuration: "));
        assert!(!err.already_logged());
    }
}
