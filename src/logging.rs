//! Diagnostic logging.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `BWSM_LOG` takes an `EnvFilter` directive (e.g. `bwsm=debug`); without
//! it the level is `warn`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BWSM_LOG";

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
