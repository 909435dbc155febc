//! Declarative logger configuration
//!
//! [`LoggerConfig`] is the serde-friendly form of [`LoggerBuilder`]: every
//! field has a default, so a partial document is enough.
//!
//! ```
//! use rust_batch_logger::core::LoggerConfig;
//!
//! let config: LoggerConfig = serde_json::from_str(
//!     r#"{ "level": "warn", "formatter": "json", "buffer_size": 20 }"#,
//! ).unwrap();
//! let logger = config.into_builder().unwrap().build().unwrap();
//! assert!(!logger.is_enabled(rust_batch_logger::LogLevel::Info));
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::LoggerBuilder;
use crate::formatters::Formatter;
use crate::sinks::ConsoleSink;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum level, lowercase. Unrecognized values mean `info`.
    #[serde(deserialize_with = "lenient_level")]
    pub level: LogLevel,
    /// `"text"` or `"json"`; anything else means text
    pub formatter: String,
    /// `"stdout"`, `"stderr"` or `"file://<path>"`
    pub outputs: Vec<String>,
    /// Lines per flush
    pub buffer_size: Option<usize>,
    /// Timer flush interval in milliseconds
    pub flush_interval_ms: Option<u64>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            formatter: "text".to_string(),
            outputs: vec!["stdout".to_string()],
            buffer_size: None,
            flush_interval_ms: None,
        }
    }
}

impl LoggerConfig {
    /// Validate the outputs and turn the configuration into a builder
    pub fn into_builder(self) -> Result<LoggerBuilder> {
        let mut builder = LoggerBuilder::new()
            .min_level(self.level)
            .formatter(Formatter::named(&self.formatter));

        for output in &self.outputs {
            builder = add_output(builder, output)?;
        }
        if let Some(size) = self.buffer_size {
            builder = builder.buffer_size(size);
        }
        if let Some(ms) = self.flush_interval_ms {
            builder = builder.flush_interval(Duration::from_millis(ms));
        }
        Ok(builder)
    }
}

fn lenient_level<'de, D>(deserializer: D) -> std::result::Result<LogLevel, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Name(String),
        Other(serde::de::IgnoredAny),
    }

    let level = match RawLevel::deserialize(deserializer)? {
        RawLevel::Name(name) => name.parse().ok(),
        RawLevel::Other(_) => None,
    };
    Ok(level.unwrap_or_else(|| {
        tracing::debug!("unrecognized level in logger config, using info");
        LogLevel::Info
    }))
}

fn add_output(builder: LoggerBuilder, output: &str) -> Result<LoggerBuilder> {
    match output {
        "stdout" => Ok(builder.sink(ConsoleSink::stdout())),
        "stderr" => Ok(builder.sink(ConsoleSink::stderr())),
        _ => match output.strip_prefix(FILE_SCHEME) {
            Some(path) if !path.is_empty() => file_output(builder, path),
            _ => Err(LoggerError::config(
                "outputs",
                format!("unsupported output '{}'", output),
            )),
        },
    }
}

#[cfg(feature = "file")]
fn file_output(builder: LoggerBuilder, path: &str) -> Result<LoggerBuilder> {
    use crate::sinks::{FileSink, OpenMode};
    Ok(builder.sink(FileSink::new(path, OpenMode::Append)?))
}

#[cfg(not(feature = "file"))]
fn file_output(_builder: LoggerBuilder, path: &str) -> Result<LoggerBuilder> {
    Err(LoggerError::config(
        "outputs",
        format!("file output '{}' requires the `file` feature", path),
    ))
}
