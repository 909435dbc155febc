//! Log record structure

use super::context::Context;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::panic::Location;

/// One logging event. Built once per call, then only read by formatters.
///
/// Positional arguments travel next to the record rather than inside it:
/// how they are interpreted is up to the formatter.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub caller: Option<String>,
    pub context: Context,
}

impl LogRecord {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            caller: None,
            context: Context::default(),
        }
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn with_location(self, location: &Location<'_>) -> Self {
        self.with_caller(format!(
            "{}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ))
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Milliseconds since the Unix epoch
    pub fn epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}
