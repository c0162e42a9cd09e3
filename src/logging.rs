//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and a JSON or
//! pretty-printed fmt layer. `RUST_LOG`, when set, takes precedence over the configured
//! level.
//!
//! | Variable                     | Default | Meaning                                  |
//! |------------------------------|---------|------------------------------------------|
//! | `EDGE_LOG_LEVEL`             | `info`  | trace/debug/info/warn/error              |
//! | `EDGE_LOG_FORMAT`            | `json`  | `json` or `pretty`                       |
//! | `EDGE_LOG_TARGET_FILTER`     | -       | extra directives, e.g. `reqwest=warn`    |
//! | `EDGE_LOG_INCLUDE_LOCATION`  | `false` | include `file:line` in each event        |
//! | `EDGE_LOG_ASYNC`             | `true`  | write through a background thread        |

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Extra filter directives, comma-separated
    pub target_filter: Option<String>,
    pub include_location: bool,
    /// Write events from a background thread
    pub async_logging: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            format: LogFormat::Json,
            target_filter: None,
            include_location: false,
            async_logging: true,
        }
    }
}

impl LogConfig {
    /// Read `EDGE_LOG_*` variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`LogConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            log_level: lookup("EDGE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("EDGE_LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(defaults.format),
            target_filter: lookup("EDGE_LOG_TARGET_FILTER").filter(|f| !f.trim().is_empty()),
            include_location: flag("EDGE_LOG_INCLUDE_LOCATION", defaults.include_location),
            async_logging: flag("EDGE_LOG_ASYNC", defaults.async_logging),
        }
    }

    /// Verbose, human-readable, synchronous
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_owned(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
            async_logging: false,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// Filter for this configuration, without consulting `RUST_LOG`
    pub fn filter(&self) -> EnvFilter {
        self.with_target_directives(EnvFilter::new(self.level().as_str()))
    }

    fn with_target_directives(&self, mut filter: EnvFilter) -> EnvFilter {
        let Some(targets) = &self.target_filter else {
            return filter;
        };
        for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
            }
        }
        filter
    }
}

/// Install the global subscriber for `config`.
///
/// With async logging the returned guard flushes buffered events when dropped; keep it
/// alive for the lifetime of the program.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.with_target_directives(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level().as_str())),
    );

    let (writer, guard) = if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let config = LogConfig::from_lookup(lookup(&[
            ("EDGE_LOG_LEVEL", "debug"),
            ("EDGE_LOG_FORMAT", "pretty"),
            ("EDGE_LOG_TARGET_FILTER", "reqwest=warn"),
            ("EDGE_LOG_INCLUDE_LOCATION", "true"),
            ("EDGE_LOG_ASYNC", "nope"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.target_filter.as_deref(), Some("reqwest=warn"));
        assert!(config.include_location);
        assert!(config.async_logging);
    }

    #[test]
    fn test_filter_includes_target_directives() {
        let config = LogConfig {
            target_filter: Some("reqwest=warn, ,edgeroute::app=trace".into()),
            ..LogConfig::default()
        };
        let rendered = config.filter().to_string();
        assert!(rendered.contains("reqwest=warn"));
        assert!(rendered.contains("edgeroute::app=trace"));
        assert_eq!(LogConfig::default_dev().level(), Level::DEBUG);
    }
}
