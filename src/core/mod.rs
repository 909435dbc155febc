//! Core logger types and traits

pub mod buffer;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod render;
pub mod sink;
pub mod style;
pub mod timestamp;
pub mod value;

pub use buffer::{close_all, BufferPolicy, FlushBuffer, FlushTimer, FlushTrigger};
pub use config::LoggerConfig;
pub use context::Context;
pub use dispatcher::SinkDispatcher;
pub use error::{ErrorCallback, LoggerError, Result};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use record::LogRecord;
pub use render::{render, RenderOptions, DEPTH_PLACEHOLDER};
pub use sink::{FnSink, Sink};
pub use style::{strip_ansi, ANSI_PATTERN};
pub use timestamp::{DatePattern, JsonTimestamp, DEFAULT_DATE_PATTERN};
pub use value::{Object, Value, CIRCULAR_MARKER, FUNCTION_TOKEN};
