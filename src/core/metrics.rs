//! Logger metrics for observability
//!
//! Counters for records accepted and filtered, flush events per trigger,
//! lines handed to sinks, and sink failures.

use super::buffer::FlushTrigger;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_batch_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_logged();
/// metrics.record_filtered();
///
/// assert_eq!(metrics.total_logged(), 1);
/// assert_eq!(metrics.filtered_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records rendered and pushed to the buffer
    total_logged: AtomicU64,

    /// Records rejected by the level filter
    filtered_count: AtomicU64,

    /// Flushes fired because the buffer reached capacity
    capacity_flushes: AtomicU64,

    /// Flushes fired by the interval timer
    timer_flushes: AtomicU64,

    /// Flushes requested explicitly
    manual_flushes: AtomicU64,

    /// Final flushes at shutdown
    exit_flushes: AtomicU64,

    /// Flushes that carried no lines
    empty_flushes: AtomicU64,

    /// Lines handed to the sinks across all flushes
    lines_dispatched: AtomicU64,

    /// Sink writes that failed or panicked
    sink_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            total_logged: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
            capacity_flushes: AtomicU64::new(0),
            timer_flushes: AtomicU64::new(0),
            manual_flushes: AtomicU64::new(0),
            exit_flushes: AtomicU64::new(0),
            empty_flushes: AtomicU64::new(0),
            lines_dispatched: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn total_logged(&self) -> u64 {
        self.total_logged.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    /// Number of flushes fired by `trigger`
    #[inline]
    pub fn flushes(&self, trigger: FlushTrigger) -> u64 {
        self.flush_counter(trigger).load(Ordering::Relaxed)
    }

    /// Number of flushes across all triggers
    pub fn total_flushes(&self) -> u64 {
        [
            FlushTrigger::Capacity,
            FlushTrigger::Timer,
            FlushTrigger::Manual,
            FlushTrigger::Exit,
        ]
        .into_iter()
        .map(|trigger| self.flushes(trigger))
        .sum()
    }

    #[inline]
    pub fn empty_flushes(&self) -> u64 {
        self.empty_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn lines_dispatched(&self) -> u64 {
        self.lines_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// Record a record pushed to the buffer
    #[inline]
    pub fn record_logged(&self) -> u64 {
        self.total_logged.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a record rejected by the level filter
    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Record one flush of `lines` lines
    pub fn record_flush(&self, trigger: FlushTrigger, lines: usize) {
        self.flush_counter(trigger).fetch_add(1, Ordering::Relaxed);
        if lines == 0 {
            self.empty_flushes.fetch_add(1, Ordering::Relaxed);
        }
        self.lines_dispatched
            .fetch_add(lines as u64, Ordering::Relaxed);
    }

    /// Record a failed sink write
    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    fn flush_counter(&self, trigger: FlushTrigger) -> &AtomicU64 {
        match trigger {
            FlushTrigger::Capacity => &self.capacity_flushes,
            FlushTrigger::Timer => &self.timer_flushes,
            FlushTrigger::Manual => &self.manual_flushes,
            FlushTrigger::Exit => &self.exit_flushes,
        }
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.total_logged(), 0);
        assert_eq!(metrics.filtered_count(), 0);
        assert_eq!(metrics.total_flushes(), 0);
        assert_eq!(metrics.lines_dispatched(), 0);
        assert_eq!(metrics.sink_failures(), 0);
    }

    #[test]
    fn test_metrics_record_logged() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_logged(), 0); // Returns previous value
        metrics.record_logged();
        assert_eq!(metrics.total_logged(), 2);
    }

    #[test]
    fn test_metrics_flushes_by_trigger() {
        let metrics = LoggerMetrics::new();
        metrics.record_flush(FlushTrigger::Capacity, 3);
        metrics.record_flush(FlushTrigger::Timer, 2);
        metrics.record_flush(FlushTrigger::Timer, 0);
        metrics.record_flush(FlushTrigger::Exit, 0);

        assert_eq!(metrics.flushes(FlushTrigger::Capacity), 1);
        assert_eq!(metrics.flushes(FlushTrigger::Timer), 2);
        assert_eq!(metrics.flushes(FlushTrigger::Manual), 0);
        assert_eq!(metrics.total_flushes(), 4);
        assert_eq!(metrics.empty_flushes(), 2);
        assert_eq!(metrics.lines_dispatched(), 5);
    }
}
