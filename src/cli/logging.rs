//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when RUST_LOG is not set, by `-v` count
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber writing to stderr.
///
/// RUST_LOG takes precedence over the verbosity flag. Calling this twice
/// is harmless; the first subscriber stays.
pub fn init_logging(verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
