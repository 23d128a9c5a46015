//! Structured logging layer using the tracing crate.
//!
//! Human logs go to stderr (compact or JSON). When a NETCONF log path is
//! configured a second layer writes every NETCONF exchange to that file,
//! whatever the stderr level is.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::error::{Error, ErrorContext, Result};

/// Target prefix of the NETCONF exchange events
pub const NETCONF_TARGET: &str = "junos_provider::netconf";

/// Output format of the stderr layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Builder for the global subscriber.
#[derive(Debug, Clone, Default)]
pub struct LoggingBuilder {
    verbosity: u8,
    format: LogFormat,
    ansi: bool,
    netconf_log: Option<PathBuf>,
}

impl LoggingBuilder {
    /// Create a new logging builder with default configuration.
    pub fn new() -> Self {
        Self {
            ansi: true,
            ..Default::default()
        }
    }

    /// Set verbosity from the `-v` count.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi = enabled;
        self
    }

    /// Also write NETCONF exchanges to this file.
    pub fn with_netconf_log(mut self, path: Option<impl AsRef<Path>>) -> Self {
        self.netconf_log = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Level directive for the configured verbosity.
    pub fn level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn build_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level()))
    }

    /// Build the layers without installing them.
    pub fn build_layers(&self) -> Result<Vec<Box<dyn Layer<Registry> + Send + Sync>>> {
        let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

        let stderr_layer = match self.format {
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_ansi(self.ansi)
                .with_target(self.verbosity >= 3)
                .with_writer(io::stderr)
                .with_filter(self.build_filter())
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_filter(self.build_filter())
                .boxed(),
        };
        layers.push(stderr_layer);

        if let Some(ref path) = self.netconf_log {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open NETCONF log {}", path.display()))?;
            let netconf_layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .with_filter(filter_fn(|meta| meta.target().starts_with(NETCONF_TARGET)))
                .boxed();
            layers.push(netconf_layer);
        }

        Ok(layers)
    }

    /// Build and install the global subscriber.
    pub fn init(self) -> Result<()> {
        let layers = self.build_layers()?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| Error::Config(e.to_string()))
    }
}
