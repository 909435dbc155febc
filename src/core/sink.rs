//! Sink trait for log output destinations

use super::error::Result;
use std::fmt;

/// Destination for rendered lines.
///
/// A sink receives each flushed batch in push order. It owns its I/O: a
/// failure is returned to the dispatcher, which reports it through the
/// logger's error callback and never into the logging call.
pub trait Sink: Send + Sync {
    fn write_batch(&self, batch: &[String]) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Sink backed by a closure
///
/// # Example
///
/// ```
/// use rust_batch_logger::core::{FnSink, Sink};
///
/// let sink = FnSink::new("stderr", |batch: &[String]| {
///     eprint!("{}", batch.concat());
///     Ok(())
/// });
/// assert_eq!(sink.name(), "stderr");
/// ```
pub struct FnSink<F> {
    name: String,
    write: F,
}

impl<F> FnSink<F>
where
    F: Fn(&[String]) -> Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, write: F) -> Self {
        Self {
            name: name.into(),
            write,
        }
    }
}

impl<F> Sink for FnSink<F>
where
    F: Fn(&[String]) -> Result<()> + Send + Sync,
{
    fn write_batch(&self, batch: &[String]) -> Result<()> {
        (self.write)(batch)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").field("name", &self.name).finish()
    }
}
