//! Diagnostic logging for the binary
//!
//! Logging is off unless `CORTEN_LINT_LOG` (or `RUST_LOG`) is set. Values
//! use the `RUST_LOG` filter syntax, e.g. `debug` or `linter=trace`.
//! Output goes to stderr so it never mixes with reports on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "CORTEN_LINT_LOG";

/// Build the filter from `CORTEN_LINT_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> Option<EnvFilter> {
    if let Ok(value) = std::env::var(LOG_ENV) {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    std::env::var("RUST_LOG")
        .ok()
        .map(|_| EnvFilter::from_default_env())
}

/// Install the global subscriber when logging was requested.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };
    // A subscriber installed earlier (e.g. by a test harness) wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
