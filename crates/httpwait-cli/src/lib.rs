pub mod actions;
pub mod config;
pub mod error;
pub mod logging;

use tokio_util::sync::CancellationToken;

use httpwait_core::{Credentials, PollRequest, PollSuccess, poll_with_tracing};
use httpwait_reqwest::ReqwestTransport;

use crate::config::Settings;
use crate::error::AppError;

/// Build the request and client from `settings`, then poll until success,
/// timeout or cancellation.
pub async fn run(settings: &Settings, cancel: &CancellationToken) -> Result<PollSuccess, AppError> {
    let request = settings.to_request()?;
    let transport = ReqwestTransport::new(settings.transport_config()?)?;
    log_request(&request);
    Ok(poll_with_tracing(&request, &transport, cancel).await?)
}

/// Header values and credentials stay out of the log.
fn log_request(request: &PollRequest) {
    let expectation = request.expectation();
    tracing::info!(
        url = request.url(),
        method = request.method(),
        expected_status = expectation.status(),
        expected_field = ?expectation.field().map(ToString::to_string),
        expected_value = ?expectation.value(),
        timeout_secs = request.timeout_secs(),
        interval_secs = request.interval_secs(),
        "Waiting for endpoint"
    );
    tracing::debug!(
        headers = ?request.headers().keys().collect::<Vec<_>>(),
        auth = ?request.credentials().map(Credentials::scheme),
        "Request options"
    );
}

/// Cancel `cancel` on Ctrl+C or SIGTERM.
pub fn spawn_signal_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::warn!("Shutdown signal received, cancelling");
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {e}");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Log a failed run and, on a GitHub runner, annotate the job.
pub fn report_failure(err: &AppError) {
    let summary = err.summary();
    if !err.already_logged() {
        tracing::error!("{summary}");
    }
    if actions::is_github_actions() {
        println!("{}", actions::error_command(&summary));
    }
}
