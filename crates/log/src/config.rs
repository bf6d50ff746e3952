//! Logging configuration

mod presets;

use serde::{Deserialize, Serialize};

/// Environment variable read before `RUST_LOG` by [`Config::from_env`]
pub const LOG_ENV: &str = "STRAND_LOG";

/// Environment variable selecting the output [`Format`]
pub const FORMAT_ENV: &str = "STRAND_LOG_FORMAT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Level filter in `EnvFilter` syntax (e.g. "info", "debug,strand_resource=trace")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Colorize output
    pub ansi: bool,

    /// Include the event target (module path)
    pub target: bool,

    /// Include the emitting thread name; executors name their threads
    pub thread_names: bool,

    /// Route output through the test writer so `cargo test` captures it
    pub test_writer: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Single-line
    Compact,
    /// Structured JSON, one object per line
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            ansi: true,
            target: true,
            thread_names: true,
            test_writer: false,
        }
    }
}
