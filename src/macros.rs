//! Logging macros for ergonomic log calls.
//!
//! Every argument after the logger is converted with [`Value::from`], so
//! strings, numbers, booleans, options, vectors and [`Value`]s mix freely.
//!
//! [`Value::from`]: crate::Value
//! [`Value`]: crate::Value
//!
//! # Examples
//!
//! ```
//! use rust_batch_logger::prelude::*;
//! use rust_batch_logger::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // Key/value style, read as pairs by the JSON formatter
//! let port = 8080;
//! info!(logger, "port", port, "tls", false);
//!
//! // Structured payloads
//! info!(logger, "request", Value::object([("path", "/"), ("status", "ok")]));
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_batch_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_batch_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "code", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {
        $logger.log($level, &[$($crate::Value::from($arg)),*])
    };
}

/// Log at trace level.
///
/// ```
/// # use rust_batch_logger::prelude::*;
/// # let logger = Logger::builder().min_level(LogLevel::Trace).build().unwrap();
/// use rust_batch_logger::trace;
/// trace!(logger, "entering", "calculate");
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Trace $(, $arg)*)
    };
}

/// Log at debug level.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $arg)*)
    };
}

/// Log at info level.
///
/// ```
/// # use rust_batch_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_batch_logger::info;
/// info!(logger, "Processing", 100, "items");
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info $(, $arg)*)
    };
}

/// Log at warn level.
#[macro_export]
macro_rules! warn {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Warn $(, $arg)*)
    };
}

/// Log at error level.
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $arg)*)
    };
}

/// Log at fatal level. Exits the process unless the logger was built
/// with `exit_on_fatal(false)`.
#[macro_export]
macro_rules! fatal {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Fatal $(, $arg)*)
    };
}
