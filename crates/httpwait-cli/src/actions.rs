//! GitHub Actions runner integration.

/// Whether the process runs inside a GitHub Actions job.
pub fn is_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Set by the runner when step debug logging is enabled.
pub fn runner_debug() -> bool {
    std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1")
}

/// An `::error::` workflow command that annotates the job with `message`.
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message() {
        assert_eq!(
            error_command("Timeout after 5 seconds."),
            "::error::Timeout after 5 seconds."
        );
    }

    #[test]
    fn escapes_newlines_and_percent() {
        assert_eq!(
            error_command("100% down\r\nretry"),
            "::error::100%25 down%0D%0Aretry"
        );
    }
}
