//! Record formatters
//!
//! A formatter turns one [`LogRecord`] and the positional arguments of the
//! call into exactly one rendered line, newline included. Formatters are
//! pure: they never fail and never touch the record.

pub mod json;
pub mod text;

pub use json::{JsonField, JsonFormatter};
pub use text::{TextFormatter, DEFAULT_TEMPLATE};

use crate::core::{LogRecord, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Anything that can render a record into a line
pub trait RecordFormatter: Send + Sync {
    fn format(&self, record: &LogRecord, args: &[Value]) -> String;
}

impl<F> RecordFormatter for F
where
    F: Fn(&LogRecord, &[Value]) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord, args: &[Value]) -> String {
        self(record, args)
    }
}

/// Formatter selected for a logger, resolved once at construction
#[derive(Clone)]
pub enum Formatter {
    Text(TextFormatter),
    Json(JsonFormatter),
    Custom(Arc<dyn RecordFormatter>),
}

impl Formatter {
    /// Built-in formatter by name. Unknown names fall back to text.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_batch_logger::Formatter;
    ///
    /// assert!(matches!(Formatter::named("json"), Formatter::Json(_)));
    /// assert!(matches!(Formatter::named("yaml"), Formatter::Text(_)));
    /// ```
    pub fn named(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Formatter::Json(JsonFormatter::default()),
            "text" => Formatter::Text(TextFormatter::default()),
            other => {
                tracing::debug!(formatter = other, "unknown formatter name, using text");
                Formatter::Text(TextFormatter::default())
            }
        }
    }

    pub fn custom<F: RecordFormatter + 'static>(formatter: F) -> Self {
        Formatter::Custom(Arc::new(formatter))
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Text(TextFormatter::default())
    }
}

impl RecordFormatter for Formatter {
    fn format(&self, record: &LogRecord, args: &[Value]) -> String {
        match self {
            Formatter::Text(text) => text.format(record, args),
            Formatter::Json(json) => json.format(record, args),
            Formatter::Custom(custom) => custom.format(record, args),
        }
    }
}

impl From<TextFormatter> for Formatter {
    fn from(formatter: TextFormatter) -> Self {
        Formatter::Text(formatter)
    }
}

impl From<JsonFormatter> for Formatter {
    fn from(formatter: JsonFormatter) -> Self {
        Formatter::Json(formatter)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formatter::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Formatter::Json(json) => f.debug_tuple("Json").field(json).finish(),
            Formatter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Caller location relative to the working directory when possible
pub(crate) fn relative_caller(caller: &str) -> String {
    let path = Path::new(caller);
    if path.is_absolute() {
        if let Ok(cwd) = std::env::current_dir() {
            if let Ok(relative) = path.strip_prefix(&cwd) {
                return relative.display().to_string();
            }
        }
    }
    caller.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_custom_closure_formatter() {
        let formatter = Formatter::custom(|record: &LogRecord, args: &[Value]| {
            format!("{}:{}\n", record.level.name(), args.len())
        });
        let line = formatter.format(&LogRecord::new(LogLevel::Warn), &[Value::from(1)]);
        assert_eq!(line, "warn:1\n");
    }

    #[test]
    fn test_relative_caller() {
        assert_eq!(relative_caller("src/main.rs:1:1"), "src/main.rs:1:1");
        let cwd = std::env::current_dir().unwrap();
        let absolute = cwd.join("src").join("lib.rs:4:2");
        assert_eq!(
            relative_caller(&absolute.display().to_string()),
            Path::new("src").join("lib.rs:4:2").display().to_string()
        );
    }
}
