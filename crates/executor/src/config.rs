//! Executor group configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ExecutorError, Result};

/// Environment variable overriding [`ExecutorConfig::threads`].
pub const THREADS_ENV: &str = "STRAND_EXECUTOR_THREADS";

/// Environment variable overriding [`ExecutorConfig::thread_name_prefix`].
pub const THREAD_PREFIX_ENV: &str = "STRAND_EXECUTOR_THREAD_PREFIX";

/// Configuration for an [`ExecutorGroup`](crate::ExecutorGroup)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutorConfig {
    /// Number of executors in the group; `0` picks twice the available parallelism
    pub threads: usize,
    /// Prefix for executor thread names, suffixed with the member index
    pub thread_name_prefix: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            thread_name_prefix: "strand-executor".to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Configuration with a fixed number of executors.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    /// Set the thread name prefix.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Defaults overridden by `STRAND_EXECUTOR_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(THREADS_ENV) {
            match raw.trim().parse() {
                Ok(threads) => config.threads = threads,
                Err(e) => tracing::warn!(
                    var = THREADS_ENV,
                    value = %raw,
                    error = %e,
                    "ignoring unparseable executor thread count"
                ),
            }
        }
        if let Ok(prefix) = std::env::var(THREAD_PREFIX_ENV) {
            config.thread_name_prefix = prefix;
        }
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.thread_name_prefix.trim().is_empty() {
            return Err(ExecutorError::invalid_argument(
                "thread_name_prefix must not be empty",
            ));
        }
        Ok(())
    }

    /// Number of executors the group will start.
    pub fn resolved_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get() * 2)
            .unwrap_or(2)
    }
}
