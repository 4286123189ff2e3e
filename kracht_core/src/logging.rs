//! Tracing subscriber setup for the `kracht` binary.
//!
//! Diagnostics go to stderr so the workout screen on stdout stays clean.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is unset and `--verbose` is not given
pub const DEFAULT_LEVEL: &str = "warn";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn init() {
    init_with_level(DEFAULT_LEVEL)
}

/// Install the subscriber, falling back to `default_level` without `RUST_LOG`
///
/// A second call is a no-op.
pub fn init_with_level(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
