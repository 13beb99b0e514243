//! Logging setup for the `batch-import` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or to the embedding application).
//!
//! # Log Levels
//!
//! - `warn`: first row rejected, input discarded
//! - `info`: matrix construction outcome
//! - `debug`: per-file decoding details (format, encoding, delimiter, rows)
//! - `trace`: everything, including dependencies

use std::io;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Map the number of `-v` flags to a level. Zero keeps the output to warnings.
pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise `level` for this crate and
/// warnings for everything else.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        EnvFilter::new(format!("warn,batch_import={level}"))
    })
}

/// Install a stderr subscriber, keeping stdout free for JSON output.
///
/// Calling this twice is harmless: the second subscriber is ignored.
pub fn init_logging(verbosity: u8) {
    let filter = build_env_filter(level_from_verbosity(verbosity));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbosity > 1)
        .try_init();
}
