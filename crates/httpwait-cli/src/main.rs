use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use httpwait::config::{Cli, LogFormat, Settings};
use httpwait::error::AppError;
use httpwait::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load(&cli);
    let log_format = match &settings {
        Ok(s) => s.log_format,
        Err(_) => cli
            .log_format
            .as_deref()
            .and_then(|raw| LogFormat::parse(raw).ok())
            .unwrap_or_default(),
    };
    logging::init(log_format);

    let cancel = CancellationToken::new();
    httpwait::spawn_signal_handler(cancel.clone());

    let result = match settings {
        Ok(settings) => httpwait::run(&settings, &cancel).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            httpwait::report_failure(&err);
            ExitCode::from(err.exit_code())
        },
    }
}
