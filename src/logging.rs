use tracing_subscriber::{fmt, EnvFilter};

use crate::stderr_buffer::BufferedWriter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "CREDIT_SCOPE_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "credit_scope=debug"
    } else {
        "credit_scope=warn"
    }
}

/// Install the global subscriber. Output goes through the stderr buffer so
/// log lines do not tear the dashboard while it owns the terminal.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(BufferedWriter::new)
        .try_init();
}
