//! Main logger implementation

use super::{
    buffer::{self, BufferPolicy, FlushBuffer, FlushTimer, FlushTrigger},
    context::Context,
    dispatcher::SinkDispatcher,
    error::{ErrorCallback, LoggerError, Result},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    record::LogRecord,
    sink::Sink,
    value::Value,
};
use crate::formatters::{Formatter, RecordFormatter};
use crate::sinks::ConsoleSink;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by a logger and every child derived from it
struct Shared {
    min_level: LogLevel,
    formatter: Formatter,
    policy: BufferPolicy,
    dispatcher: SinkDispatcher,
    capture_caller: bool,
    exit_on_fatal: bool,
}

/// Leveled logger with a context, a formatter and a flush buffer.
///
/// Each call renders one line on the caller's thread and pushes it into
/// the buffer; the buffer decides when lines reach the sinks. Dropping the
/// logger stops its flush timer and flushes what is left.
///
/// # Example
///
/// ```
/// use rust_batch_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .formatter(TextFormatter::new("[%lvl%] %ctx% %args%").with_styled(false))
///     .buffer_size(10)
///     .context(Context::new().with_field("service", "billing"))
///     .build()
///     .unwrap();
///
/// logger.info(&["invoice sent".into(), Value::from(42)]);
/// ```
pub struct Logger {
    shared: Arc<Shared>,
    context: Context,
    buffer: Arc<FlushBuffer>,
    timer: Option<FlushTimer>,
}

impl Logger {
    /// Info level, text formatter, one line per flush to stdout
    #[must_use]
    pub fn new() -> Self {
        let policy = BufferPolicy::default();
        let sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(ConsoleSink::stdout())];
        let dispatcher = SinkDispatcher::new(sinks, None, Arc::new(LoggerMetrics::new()));
        let buffer = Arc::new(FlushBuffer::new(policy, dispatcher.clone()));
        buffer::register(&buffer);
        Self {
            shared: Arc::new(Shared {
                min_level: LogLevel::Info,
                formatter: Formatter::default(),
                policy,
                dispatcher,
                capture_caller: true,
                exit_on_fatal: true,
            }),
            context: Context::new(),
            buffer,
            timer: None,
        }
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    fn assemble(shared: Arc<Shared>, context: Context) -> Result<Self> {
        let buffer = Arc::new(FlushBuffer::new(shared.policy, shared.dispatcher.clone()));
        let timer = match shared.policy.flush_interval {
            Some(interval) => Some(
                FlushTimer::start(Arc::clone(&buffer), interval)
                    .map_err(|e| LoggerError::io_operation("starting flush timer", e.to_string(), e))?,
            ),
            None => None,
        };
        buffer::register(&buffer);
        Ok(Self {
            shared,
            context,
            buffer,
            timer,
        })
    }

    /// Derive a logger whose context is this one's merged with `context`.
    ///
    /// The child shares the formatter, sinks and buffer policy, and gets a
    /// buffer (and timer) of its own.
    pub fn child(&self, context: Context) -> Result<Logger> {
        Self::assemble(Arc::clone(&self.shared), self.context.merge(&context))
    }

    /// Whether a record at `level` would be emitted
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.shared.min_level)
    }

    pub fn min_level(&self) -> LogLevel {
        self.shared.min_level
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn policy(&self) -> BufferPolicy {
        self.shared.policy
    }

    /// Lines waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Get the logger metrics, shared by the whole logger lineage
    pub fn metrics(&self) -> &LoggerMetrics {
        self.shared.dispatcher.metrics()
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, args: &[Value]) {
        let metrics = self.shared.dispatcher.metrics();
        if !self.is_enabled(level) {
            metrics.record_filtered();
            return;
        }

        let mut record = LogRecord::new(level).with_context(self.context.clone());
        if self.shared.capture_caller {
            record = record.with_location(Location::caller());
        }
        let line = self.shared.formatter.format(&record, args);

        metrics.record_logged();
        self.buffer.push(line);

        if level == LogLevel::Fatal && self.shared.exit_on_fatal {
            self.buffer.close();
            buffer::close_all();
            std::process::exit(1);
        }
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, args: &[Value]) {
        self.log(LogLevel::Trace, args);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, args: &[Value]) {
        self.log(LogLevel::Debug, args);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, args: &[Value]) {
        self.log(LogLevel::Info, args);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, args: &[Value]) {
        self.log(LogLevel::Warn, args);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, args: &[Value]) {
        self.log(LogLevel::Error, args);
    }

    /// Log at fatal level. Unless disabled with
    /// [`LoggerBuilder::exit_on_fatal`], this logger's buffer and then every
    /// other live logger's buffer are flushed, and the process exits with
    /// status 1.
    #[inline]
    #[track_caller]
    pub fn fatal(&self, args: &[Value]) {
        self.log(LogLevel::Fatal, args);
    }

    /// Hand everything buffered to the sinks now and flush the sinks.
    ///
    /// Returns the number of lines dispatched.
    pub fn flush(&self) -> usize {
        let dispatched = self.buffer.flush(FlushTrigger::Manual);
        self.shared.dispatcher.flush_sinks();
        dispatched
    }

    /// Stop the flush timer and run the final flush.
    ///
    /// Returns `false` if the logger was already shut down.
    pub fn shutdown(&mut self) -> bool {
        if let Some(mut timer) = self.timer.take() {
            timer.stop();
        }
        self.buffer.close()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown();
        buffer::unregister(&self.buffer);
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_batch_logger::prelude::*;
/// use std::time::Duration;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Warn)
///     .formatter(Formatter::named("json"))
///     .sink(ConsoleSink::stderr())
///     .buffer_size(100)
///     .flush_interval(Duration::from_secs(1))
///     .on_error(|e| eprintln!("log delivery failed: {}", e))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    formatter: Formatter,
    sinks: Vec<Arc<dyn Sink>>,
    buffer_size: Option<usize>,
    flush_interval: Option<Duration>,
    context: Context,
    on_error: Option<ErrorCallback>,
    capture_caller: bool,
    exit_on_fatal: bool,
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("min_level", &self.min_level)
            .field("formatter", &self.formatter)
            .field("sinks", &self.sinks.len())
            .field("buffer_size", &self.buffer_size)
            .field("flush_interval", &self.flush_interval)
            .field("context", &self.context)
            .field("on_error", &self.on_error.is_some())
            .field("capture_caller", &self.capture_caller)
            .field("exit_on_fatal", &self.exit_on_fatal)
            .finish()
    }
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            formatter: Formatter::default(),
            sinks: Vec::new(),
            buffer_size: None,
            flush_interval: None,
            context: Context::new(),
            on_error: None,
            capture_caller: true,
            exit_on_fatal: true,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = formatter.into();
        self
    }

    /// Add a sink. Without any, lines go to stdout.
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is also held elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Flush every `size` lines. Defaults to 1, or unbounded when only a
    /// flush interval is set.
    #[must_use = "builder methods return a new value"]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Flush whatever is buffered at this interval
    #[must_use = "builder methods return a new value"]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Fields attached to every record
    #[must_use = "builder methods return a new value"]
    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Receive sink failures instead of having them reported via `tracing`
    #[must_use = "builder methods return a new value"]
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LoggerError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Record the call site of each record (default on)
    #[must_use = "builder methods return a new value"]
    pub fn capture_caller(mut self, enabled: bool) -> Self {
        self.capture_caller = enabled;
        self
    }

    /// Exit the process after a fatal record (default on)
    #[must_use = "builder methods return a new value"]
    pub fn exit_on_fatal(mut self, enabled: bool) -> Self {
        self.exit_on_fatal = enabled;
        self
    }

    /// Build the Logger. Fails only if the flush timer cannot be started.
    pub fn build(self) -> Result<Logger> {
        let mut sinks = self.sinks;
        if sinks.is_empty() {
            sinks.push(Arc::new(ConsoleSink::stdout()));
        }
        let dispatcher = SinkDispatcher::new(sinks, self.on_error, Arc::new(LoggerMetrics::new()));
        let shared = Shared {
            min_level: self.min_level,
            formatter: self.formatter,
            policy: BufferPolicy::new(self.buffer_size, self.flush_interval),
            dispatcher,
            capture_caller: self.capture_caller,
            exit_on_fatal: self.exit_on_fatal,
        };
        Logger::assemble(Arc::new(shared), self.context)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnSink;
    use crate::formatters::TextFormatter;
    use parking_lot::Mutex;

    type Batches = Arc<Mutex<Vec<Vec<String>>>>;

    fn capture() -> (LoggerBuilder, Batches) {
        let batches: Batches = Arc::new(Mutex::new(Vec::new()));
        let sink_batches = Arc::clone(&batches);
        let builder = Logger::builder()
            .formatter(TextFormatter::new("[%lvl%] %ctx% %args%").with_styled(false))
            .sink(FnSink::new("capture", move |batch: &[String]| {
                sink_batches.lock().push(batch.to_vec());
                Ok(())
            }))
            .exit_on_fatal(false);
        (builder, batches)
    }

    #[test]
    fn test_buffer_size_three() {
        let (builder, batches) = capture();
        let logger = builder.buffer_size(3).build().unwrap();

        logger.info(&["one".into()]);
        logger.info(&["two".into()]);
        assert!(batches.lock().is_empty());
        logger.info(&["three".into()]);

        assert_eq!(
            *batches.lock(),
            vec![vec![
                "[INFO]  one\n".to_string(),
                "[INFO]  two\n".to_string(),
                "[INFO]  three\n".to_string(),
            ]]
        );
    }

    #[test]
    fn test_level_filtering() {
        let (builder, batches) = capture();
        let logger = builder.min_level(LogLevel::Warn).build().unwrap();

        logger.debug(&["hidden".into()]);
        logger.info(&["hidden".into()]);
        logger.warn(&["shown".into()]);
        logger.error(&["shown".into()]);

        let lines: Vec<String> = batches.lock().concat();
        assert_eq!(lines, vec!["[WARN]  shown\n", "[ERROR]  shown\n"]);
        assert_eq!(logger.metrics().filtered_count(), 2);
        assert_eq!(logger.metrics().total_logged(), 2);
        assert!(!logger.is_enabled(LogLevel::Info));
    }

    #[test]
    fn test_child_merges_context_and_has_own_buffer() {
        let (builder, batches) = capture();
        let parent = builder
            .buffer_size(2)
            .context(Context::new().with_field("svc", "api").with_field("v", 1))
            .build()
            .unwrap();
        let child = parent
            .child(Context::new().with_field("v", 2).with_field("req", "r1"))
            .unwrap();

        parent.info(&["p".into()]);
        child.info(&["c".into()]);
        assert_eq!(parent.buffered(), 1);
        assert_eq!(child.buffered(), 1);
        assert!(batches.lock().is_empty());

        child.info(&["c2".into()]);
        assert_eq!(
            batches.lock()[0][0],
            "[INFO] svc=\"api\", v=2, req=\"r1\" c\n"
        );
        assert!(matches!(parent.context().get("v"), Some(Value::Int(1))));
    }

    #[test]
    fn test_drop_runs_exit_flush() {
        let (builder, batches) = capture();
        let logger = builder.buffer_size(10).build().unwrap();
        logger.info(&["pending".into()]);
        assert!(batches.lock().is_empty());
        drop(logger);
        assert_eq!(*batches.lock(), vec![vec!["[INFO]  pending\n".to_string()]]);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let (builder, batches) = capture();
        let mut logger = builder.buffer_size(10).build().unwrap();
        assert!(logger.shutdown());
        assert!(!logger.shutdown());
        drop(logger);
        // A single, empty exit flush.
        assert_eq!(batches.lock().len(), 1);
    }

    #[test]
    fn test_manual_flush() {
        let (builder, batches) = capture();
        let logger = builder.buffer_size(10).build().unwrap();
        logger.warn(&["a".into(), "b".into()]);
        assert_eq!(logger.flush(), 1);
        assert_eq!(batches.lock()[0], vec!["[WARN]  a b\n".to_string()]);
        assert_eq!(logger.metrics().flushes(FlushTrigger::Manual), 1);
    }

    #[test]
    fn test_fatal_without_exit() {
        let (builder, batches) = capture();
        let logger = builder.build().unwrap();
        logger.fatal(&["boom".into()]);
        assert_eq!(batches.lock()[0], vec!["[FATAL]  boom\n".to_string()]);
    }

    #[test]
    fn test_caller_capture() {
        let batches: Batches = Arc::new(Mutex::new(Vec::new()));
        let sink_batches = Arc::clone(&batches);
        let logger = Logger::builder()
            .formatter(TextFormatter::new("%caller%").with_styled(false))
            .sink(FnSink::new("capture", move |batch: &[String]| {
                sink_batches.lock().push(batch.to_vec());
                Ok(())
            }))
            .build()
            .unwrap();

        logger.info(&[]);
        let line = batches.lock()[0][0].clone();
        assert!(line.starts_with("src/core/logger.rs:"), "{}", line);
    }

    #[test]
    fn test_timer_flushes_partial_batch() {
        let (builder, batches) = capture();
        let logger = builder
            .flush_interval(Duration::from_millis(40))
            .build()
            .unwrap();
        assert!(logger.policy().is_unbounded());

        logger.info(&["x".into()]);
        logger.info(&["y".into()]);
        std::thread::sleep(Duration::from_millis(150));

        let batches = batches.lock();
        assert_eq!(batches[0], vec!["[INFO]  x\n".to_string(), "[INFO]  y\n".to_string()]);
    }

    #[test]
    fn test_sink_errors_reach_callback() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = Arc::clone(&errors);
        let logger = Logger::builder()
            .sink(FnSink::new("broken", |_: &[String]| {
                Err(LoggerError::sink("broken", "unreachable host"))
            }))
            .on_error(move |e| errors_clone.lock().push(e.to_string()))
            .build()
            .unwrap();

        logger.error(&["lost".into()]);
        assert_eq!(*errors.lock(), vec!["Sink 'broken' failed: unreachable host"]);
        assert_eq!(logger.metrics().sink_failures(), 1);
    }
}
