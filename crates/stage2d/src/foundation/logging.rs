//! Logging setup and re-exports
//!
//! The engine itself only ever calls the `log` macros; wiring them to an
//! output is the application's choice. These helpers install `env_logger`
//! with an `info` default so demos and tests get readable output without
//! configuration.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system, panicking if a logger is already set
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initialize the logging system, ignoring an already-installed logger
pub fn try_init() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
