//! Line buffer and flush scheduling
//!
//! Rendered lines accumulate in a [`FlushBuffer`] until one of its triggers
//! hands them to the sinks:
//!
//! - **capacity**: the push that fills the buffer flushes it, synchronously
//!   and on the caller's thread;
//! - **timer**: a [`FlushTimer`] flushes whatever is buffered every
//!   interval, even when that is nothing;
//! - **exit**: [`FlushBuffer::close`] flushes the remainder exactly once
//!   when the owning logger shuts down, and [`close_all`] does it for every
//!   live buffer before a fatal exit.
//!
//! A flush takes the lines out under the state lock and queues them as a
//! batch; sinks are called afterwards under a separate delivery lock. Pushes
//! therefore never wait on a slow sink, two deliveries of the same buffer
//! never overlap, and batches reach the sinks in the order they were taken.

use super::dispatcher::SinkDispatcher;
use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::{const_mutex, Mutex};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

/// Upper bound on the slot space reserved up front for a bounded buffer
const SLOT_RESERVE: usize = 1024;

/// Buffers of every logger that has not been dropped yet
static LIVE_BUFFERS: Mutex<Vec<Weak<FlushBuffer>>> = const_mutex(Vec::new());

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// The buffer reached its capacity
    Capacity,
    /// The flush interval elapsed
    Timer,
    /// Requested through [`FlushBuffer::flush`]
    Manual,
    /// Final flush at shutdown
    Exit,
}

/// When buffered lines are handed to the sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    /// Flush as soon as this many lines are buffered
    pub capacity: Option<usize>,
    /// Flush whatever is buffered at this interval
    pub flush_interval: Option<Duration>,
}

impl Default for BufferPolicy {
    /// One line per flush, no timer
    fn default() -> Self {
        Self {
            capacity: Some(1),
            flush_interval: None,
        }
    }
}

impl BufferPolicy {
    pub fn new(capacity: Option<usize>, flush_interval: Option<Duration>) -> Self {
        Self {
            capacity,
            flush_interval,
        }
        .normalized()
    }

    /// Apply the defaults: a zero interval disables the timer, a zero
    /// capacity means one, and without a timer the capacity defaults to one
    #[must_use]
    pub fn normalized(self) -> Self {
        let flush_interval = self.flush_interval.filter(|interval| !interval.is_zero());
        let capacity = match (self.capacity, flush_interval) {
            (Some(n), _) => Some(n.max(1)),
            (None, Some(_)) => None,
            (None, None) => Some(1),
        };
        Self {
            capacity,
            flush_interval,
        }
    }

    /// Whether slots grow without bound between timer flushes
    pub fn is_unbounded(&self) -> bool {
        self.capacity.is_none()
    }
}

struct BufferState {
    slots: Vec<String>,
    pending: VecDeque<Vec<String>>,
    closed: bool,
}

/// Accumulates rendered lines for one logger
pub struct FlushBuffer {
    state: Mutex<BufferState>,
    delivery: Mutex<()>,
    capacity: Option<usize>,
    dispatcher: SinkDispatcher,
}

impl FlushBuffer {
    pub fn new(policy: BufferPolicy, dispatcher: SinkDispatcher) -> Self {
        let policy = policy.normalized();
        Self {
            state: Mutex::new(BufferState {
                slots: Vec::with_capacity(reserve_for(policy.capacity)),
                pending: VecDeque::new(),
                closed: false,
            }),
            delivery: Mutex::new(()),
            capacity: policy.capacity,
            dispatcher,
        }
    }

    /// Append a line. Flushes synchronously when the buffer becomes full.
    pub fn push(&self, line: String) {
        let full = {
            let mut state = self.state.lock();
            state.slots.push(line);
            let full = matches!(self.capacity, Some(capacity) if state.slots.len() >= capacity);
            if full {
                self.take(&mut state, FlushTrigger::Capacity);
            }
            full
        };
        if full {
            self.deliver();
        }
    }

    /// Dispatch whatever is buffered, even nothing, and reset.
    ///
    /// Returns the number of lines dispatched.
    pub fn flush(&self, trigger: FlushTrigger) -> usize {
        let taken = self.take(&mut self.state.lock(), trigger);
        self.deliver();
        taken
    }

    /// Final flush. Only the first call dispatches.
    pub fn close(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            self.take(&mut state, FlushTrigger::Exit);
        }
        self.deliver();
        self.dispatcher.flush_sinks();
        true
    }

    /// Number of lines waiting for the next flush
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn dispatcher(&self) -> &SinkDispatcher {
        &self.dispatcher
    }

    /// Move the slots into the delivery queue
    fn take(&self, state: &mut BufferState, trigger: FlushTrigger) -> usize {
        let next = Vec::with_capacity(reserve_for(self.capacity));
        let batch = std::mem::replace(&mut state.slots, next);
        let lines = batch.len();
        tracing::trace!(?trigger, lines, "flushing log buffer");
        self.dispatcher.metrics().record_flush(trigger, lines);
        state.pending.push_back(batch);
        lines
    }

    /// Hand queued batches to the sinks, oldest first.
    ///
    /// A batch queued by another thread may be delivered here; either way
    /// it has reached the sinks when this returns.
    fn deliver(&self) {
        let _delivery = self.delivery.lock();
        loop {
            // The state guard is a temporary and is released before dispatch.
            let next = self.state.lock().pending.pop_front();
            match next {
                Some(batch) => self.dispatcher.dispatch(&batch),
                None => break,
            }
        }
    }
}

fn reserve_for(capacity: Option<usize>) -> usize {
    capacity.unwrap_or(0).min(SLOT_RESERVE)
}

/// Track `buffer` so [`close_all`] reaches it
pub(crate) fn register(buffer: &Arc<FlushBuffer>) {
    let mut live = LIVE_BUFFERS.lock();
    live.retain(|weak| weak.strong_count() > 0);
    live.push(Arc::downgrade(buffer));
}

/// Stop tracking `buffer`
pub(crate) fn unregister(buffer: &Arc<FlushBuffer>) {
    let target = Arc::downgrade(buffer);
    LIVE_BUFFERS
        .lock()
        .retain(|weak| weak.strong_count() > 0 && !weak.ptr_eq(&target));
}

/// Run the exit flush of every live buffer, in registration order.
///
/// Returns the number of buffers closed by this call.
pub fn close_all() -> usize {
    let live: Vec<Arc<FlushBuffer>> = LIVE_BUFFERS
        .lock()
        .iter()
        .filter_map(Weak::upgrade)
        .collect();
    tracing::debug!(buffers = live.len(), "closing all log buffers");
    live.iter().filter(|buffer| buffer.close()).count()
}

/// Background thread flushing a buffer at a fixed rate.
///
/// Dropping the timer stops the thread and waits for it to exit.
pub struct FlushTimer {
    stop: Option<Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl FlushTimer {
    pub fn start(buffer: Arc<FlushBuffer>, interval: Duration) -> std::io::Result<Self> {
        let (stop, stopped) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name("log-flush-timer".to_string())
            .spawn(move || {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "flush timer started");
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            buffer.flush(FlushTrigger::Timer);
                        }
                        recv(stopped) -> _ => break,
                    }
                }
                tracing::debug!("flush timer stopped");
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it
    pub fn stop(&mut self) {
        // Disconnecting the channel wakes the thread.
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("flush timer thread panicked");
            }
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
