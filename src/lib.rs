//! # Rust Batch Logger
//!
//! Structured, leveled logging with batched delivery.
//!
//! ## Features
//!
//! - **Free-form payloads**: log calls take any number of [`Value`]s,
//!   including nested and even cyclic maps
//! - **Safe rendering**: depth-limited, cycle-safe value rendering with
//!   optional terminal colours
//! - **Two formatters**: `%placeholder%` text templates and flat JSON
//!   objects, or any closure
//! - **Batched delivery**: lines are flushed by count, by timer, or both,
//!   and once more when the logger goes away
//! - **Pluggable sinks**: console, file, HTTP, Logstash and Splunk presets
//!
//! ## Quick start
//!
//! ```
//! use rust_batch_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Debug)
//!     .formatter(TextFormatter::new("[%lvl%] %ctx% %args%").with_styled(false))
//!     .context(Context::new().with_field("service", "checkout"))
//!     .build()
//!     .unwrap();
//!
//! rust_batch_logger::info!(logger, "order placed", Value::object([("id", 17)]));
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Context, FnSink, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, Object, Result, Sink, Value,
    };
    pub use crate::formatters::{Formatter, JsonFormatter, RecordFormatter, TextFormatter};
    pub use crate::sinks::ConsoleSink;
}

pub use core::{
    Context, FnSink, LogLevel, LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, Object, Result, Sink, Value,
};
pub use formatters::{Formatter, JsonFormatter, RecordFormatter, TextFormatter};
pub use sinks::ConsoleSink;
