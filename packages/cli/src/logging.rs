// ABOUTME: Tracing subscriber setup for the binary
// ABOUTME: RUST_LOG wins; otherwise Flowcraft crates log at info (debug with --verbose)

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "flowcraft=info";
pub const VERBOSE_LOG_FILTER: &str = "flowcraft=debug,tower_http=debug";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

/// Install the global subscriber. Logs go to stderr so command output stays clean.
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
