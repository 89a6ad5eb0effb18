//! Tracing setup for the CLI.
//!
//! Library consumers install their own subscriber; this module only
//! exists behind the `cli` feature.

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber. `BOUGH_LOG` overrides the verbosity
/// switches when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var("BOUGH_LOG")
        .from_env_lossy();

    // Ignore errors: tests and embedders may have installed one already.
    let _ = tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn level_from_verbosity(verbosity: u8) -> tracing::metadata::LevelFilter {
    match verbosity {
        0 => tracing::metadata::LevelFilter::ERROR,
        1 => tracing::metadata::LevelFilter::INFO,
        _ => tracing::metadata::LevelFilter::DEBUG,
    }
}
