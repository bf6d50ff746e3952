//! # Strand Log
//!
//! `tracing-subscriber` setup for binaries, examples and tests.
//!
//! ```no_run
//! fn main() -> strand_log::Result<()> {
//!     let _guard = strand_log::auto_init()?;
//!     tracing::info!(threads = 4, "executor group starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod builder;
mod config;
mod error;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, FORMAT_ENV, Format, LOG_ENV};
pub use error::{Error, Result};

/// Pick a configuration from the environment and build profile, then install it
pub fn auto_init() -> Result<LoggerGuard> {
    if std::env::var(LOG_ENV).is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> Result<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> Result<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests; safe to call from every test
pub fn init_test() -> Result<LoggerGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::already_installed());
    }
    match init_with(Config::test()) {
        Err(Error::Init(_)) => Ok(LoggerGuard::already_installed()),
        other => other,
    }
}
