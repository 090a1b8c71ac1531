use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AttemptFailure, PollError};
use crate::observe::{PollObserver, TracingObserver};
use crate::request::PollRequest;
use crate::transport::Transport;
use crate::validate::validate;

/// A poll that ended with a satisfying response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSuccess {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

pub type PollOutcome = Result<PollSuccess, PollError>;

/// Poll `request` through `transport` until the expectation holds, the
/// timeout passes, or `cancel` fires.
///
/// The deadline is only checked after the post-failure sleep, so the first
/// attempt always happens and at most `floor(timeout / interval) + 1`
/// attempts are made. Cancellation interrupts both the in-flight request
/// and the sleep.
pub async fn poll<T, O>(
    request: &PollRequest,
    transport: &T,
    observer: &O,
    cancel: &CancellationToken,
) -> PollOutcome
where
    T: Transport,
    O: PollObserver + ?Sized,
{
    let start = Instant::now();
    let interval = request.interval();
    let timeout = request.timeout();
    let mut attempt: u32 = 0;
    let mut last_failure: Option<AttemptFailure> = None;

    let outcome = loop {
        if cancel.is_cancelled() {
            break Err(PollError::Cancelled { last_failure });
        }

        attempt += 1;
        observer.attempt_started(attempt);

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = transport.send(request) => Some(result),
        };
        let Some(result) = sent else {
            break Err(PollError::Cancelled { last_failure });
        };

        let failure = match result
            .map_err(AttemptFailure::from)
            .and_then(|response| validate(&response, request.expectation()))
        {
            Ok(()) => {
                break Ok(PollSuccess {
                    attempts: attempt,
                    elapsed: start.elapsed(),
                });
            },
            Err(failure) => failure,
        };
        observer.attempt_failed(attempt, &failure, interval);

        let slept = tokio::select! {
            biased;
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(interval) => true,
        };
        if !slept {
            break Err(PollError::Cancelled {
                last_failure: Some(failure),
            });
        }

        if start.elapsed() >= timeout {
            break Err(PollError::Timeout {
                timeout_secs: request.timeout_secs(),
                last_failure: failure,
            });
        }
        last_failure = Some(failure);
    };

    match &outcome {
        Ok(success) => observer.succeeded(success),
        Err(error) => observer.abandoned(error),
    }
    outcome
}

/// [`poll`] with a [`TracingObserver`] for the request.
pub async fn poll_with_tracing<T: Transport>(
    request: &PollRequest,
    transport: &T,
    cancel: &CancellationToken,
) -> PollOutcome {
    let observer = TracingObserver::new(request);
    poll(request, transport, &observer, cancel).await
}
