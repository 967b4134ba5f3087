//! Logging setup for the command line tools.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the binaries. `RUST_LOG` overrides the verbosity flag.

use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Filter directive for a `-v` count: warn, info, debug, then trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber for the given verbosity.
///
/// # Errors
///
/// Returns [`Error::Logging`] if a global subscriber is already installed.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|err| Error::Logging(err.to_string()))
}
