use std::time::Duration;

use crate::error::{AttemptFailure, PollError};
use crate::poll::PollSuccess;
use crate::request::PollRequest;

/// Receives progress from the poll loop. All methods default to no-ops.
pub trait PollObserver: Send + Sync {
    fn attempt_started(&self, _attempt: u32) {}

    fn attempt_failed(&self, _attempt: u32, _failure: &AttemptFailure, _retry_in: Duration) {}

    fn succeeded(&self, _success: &PollSuccess) {}

    fn abandoned(&self, _error: &PollError) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {}

/// Emits one `tracing` event per notification, tagged with the target URL.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    url: String,
}

impl TracingObserver {
    pub fn new(request: &PollRequest) -> Self {
        Self {
            url: request.url().to_string(),
        }
    }
}

impl PollObserver for TracingObserver {
    fn attempt_started(&self, attempt: u32) {
        tracing::debug!(url = %self.url, attempt, "Trying request");
    }

    fn attempt_failed(&self, attempt: u32, failure: &AttemptFailure, retry_in: Duration) {
        tracing::info!(
            url = %self.url,
            attempt,
            reason = %failure,
            retry_in_secs = retry_in.as_secs(),
            "Request failed"
        );
    }

    fn succeeded(&self, success: &PollSuccess) {
        tracing::info!(
            url = %self.url,
            attempts = success.attempts,
            elapsed_ms = millis(success.elapsed),
            "Endpoint ready"
        );
    }

    fn abandoned(&self, error: &PollError) {
        match error.last_failure() {
            Some(last) => {
                tracing::error!(url = %self.url, last_failure = %last, "{error}")
            },
            None => tracing::error!(url = %self.url, "{error}"),
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
