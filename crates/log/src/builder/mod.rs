//! Logger builder implementation

use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::error::{Error, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Returned by a successful initialisation.
///
/// Records whether this call installed the global subscriber or found one
/// already in place.
#[derive(Debug)]
#[must_use = "dropping the guard is harmless, but it tells you whether logging was installed"]
pub struct LoggerGuard {
    installed: bool,
}

impl LoggerGuard {
    pub(crate) fn already_installed() -> Self {
        Self { installed: false }
    }

    /// Whether this initialisation installed the global subscriber.
    pub fn is_installed(&self) -> bool {
        self.installed
    }
}

/// Build the fmt layer for one output style, honouring the writer choice.
macro_rules! fmt_layer {
    ($config:expr, $style:ident) => {{
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi($config.ansi)
            .with_target($config.target)
            .with_thread_names($config.thread_names)
            .$style();
        let boxed: BoxedLayer = if $config.test_writer {
            layer.with_test_writer().boxed()
        } else {
            layer.with_writer(std::io::stderr).boxed()
        };
        boxed
    }};
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the level filter without installing anything.
    pub fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.config.level).map_err(|e| Error::Filter {
            filter: self.config.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> Result<LoggerGuard> {
        let filter = self.filter()?;

        let fmt: BoxedLayer = match self.config.format {
            Format::Pretty => fmt_layer!(self.config, pretty),
            Format::Compact => fmt_layer!(self.config, compact),
            Format::Json => fmt_layer!(self.config, json),
        };

        tracing_subscriber::registry()
            .with(fmt)
            .with(filter)
            .try_init()
            .map_err(|e| Error::Init(e.to_string()))?;

        Ok(LoggerGuard { installed: true })
    }
}
