//! Logging setup
//!
//! Components log through `tracing` with a bracketed prefix
//! (`[RlvEngine]`, `[ForceResolver]`, ...). Hosts that do not install their own
//! subscriber can call [`init_logging`] once at startup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::core::{RlvError, RlvResult};

/// Where and how log lines are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,

    /// Write to a daily rolling file in this directory instead of stderr
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// File name prefix for the rolling file
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_filter() -> String {
    "rlv_engine=info".to_string()
}

fn default_file_prefix() -> String {
    "rlv-engine.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

impl LoggingConfig {
    /// Set the fallback filter directive
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable or disable JSON output
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Log to a rolling file in `directory`
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    fn env_filter(&self) -> RlvResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .map_err(|e| RlvError::InvalidConfig(format!("log filter: {}", e))),
        }
    }
}

/// Install the global subscriber.
///
/// Returns the file writer guard when logging to a file; keep it alive for
/// as long as logs should be flushed.
pub fn init_logging(config: &LoggingConfig) -> RlvResult<Option<WorkerGuard>> {
    let filter = config.env_filter()?;

    let (writer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let layer = if config.json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(config.directory.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| RlvError::InvalidConfig(format!("logging already initialized: {}", e)))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.filter, "rlv_engine=info");
        assert!(!config.json);
        assert!(config.directory.is_none());
    }

    #[test]
    fn test_bad_filter_rejected() {
        let config = LoggingConfig::default().with_filter("rlv_engine=loud");
        if std::env::var("RUST_LOG").is_err() {
            assert!(config.env_filter().is_err());
        }
    }
}
