//! Progress reporting and cooperative cancellation
//!
//! Both are advisory hooks for long transforms on large volumes. Neither
//! affects the numeric result of a run that completes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Receiver for row-completion counts
///
/// Called from worker threads after every row, one call at a time and with
/// strictly increasing `completed`. Calls hold up the workers, so
/// implementations must be cheap and must not block.
pub trait ProgressSink: Sync {
    /// `completed` rows out of `total` rows across all passes of the run
    fn rows_completed(&self, completed: usize, total: usize);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize) + Sync,
{
    fn rows_completed(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Shared flag to stop a running transform between rows
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Row counter shared by the workers of one run
///
/// Increment and notification happen under one lock, so the sink sees
/// `1, 2, ..., total` in order even when rows finish on several workers.
pub(crate) struct RowCounter<'a> {
    sink: &'a dyn ProgressSink,
    completed: Mutex<usize>,
    total: usize,
}

impl<'a> RowCounter<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, total: usize) -> Self {
        Self {
            sink,
            completed: Mutex::new(0),
            total,
        }
    }

    /// Count one finished row and notify the sink
    pub(crate) fn tick(&self) {
        let mut completed = self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *completed += 1;
        self.sink.rows_completed(*completed, self.total);
    }

    pub(crate) fn completed(&self) -> usize {
        *self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }
}
