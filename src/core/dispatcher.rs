//! Hands flushed batches to the configured sinks

use super::error::{ErrorCallback, LoggerError};
use super::metrics::LoggerMetrics;
use super::sink::Sink;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Ordered list of sinks plus the error policy applied to them
#[derive(Clone)]
pub struct SinkDispatcher {
    sinks: Arc<[Arc<dyn Sink>]>,
    on_error: Option<ErrorCallback>,
    metrics: Arc<LoggerMetrics>,
}

impl SinkDispatcher {
    pub fn new(
        sinks: Vec<Arc<dyn Sink>>,
        on_error: Option<ErrorCallback>,
        metrics: Arc<LoggerMetrics>,
    ) -> Self {
        Self {
            sinks: sinks.into(),
            on_error,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<LoggerMetrics> {
        &self.metrics
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Hand `batch` to every sink in order.
    ///
    /// Each sink is isolated with `catch_unwind`, so one failing or
    /// panicking sink does not keep the others from receiving the batch.
    pub fn dispatch(&self, batch: &[String]) {
        for sink in self.sinks.iter() {
            match catch_unwind(AssertUnwindSafe(|| sink.write_batch(batch))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.report(sink.name(), e),
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    self.report(sink.name(), LoggerError::sink_panic(sink.name(), panic_msg));
                }
            }
        }
    }

    /// Ask every sink to flush its own buffers
    pub fn flush_sinks(&self) {
        for sink in self.sinks.iter() {
            match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => self.report(sink.name(), e),
                Err(panic_info) => {
                    let panic_msg = panic_message(panic_info.as_ref());
                    self.report(sink.name(), LoggerError::sink_panic(sink.name(), panic_msg));
                }
            }
        }
    }

    fn report(&self, sink: &str, error: LoggerError) {
        self.metrics.record_sink_failure();
        match self.on_error {
            Some(ref callback) => callback(&error),
            None => tracing::warn!(sink, error = %error, "sink failed to write batch"),
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
