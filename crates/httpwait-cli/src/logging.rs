use tracing_subscriber::EnvFilter;

use crate::actions;
use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("httpwait={level},httpwait_core={level},httpwait_reqwest={level}")
}

/// Install the global subscriber. Logs go to stderr so stdout stays free
/// for workflow commands.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(actions::runner_debug())));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
