//! Observation hooks and metrics for the worker pool.
//!
//! This module defines the `PoolObserver` trait for watching worker activity,
//! as well as a default implementation that keeps atomic counters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::pool::task::{Task, WorkerId};
use crate::pool::WorkerExit;

/// A trait for observing the worker pool.
///
/// Hooks run on the worker thread that triggered them, outside of any queue
/// or result lock. A panicking hook is treated as a failure of that worker.
pub trait PoolObserver: Send + Sync {
    /// Called when a worker thread starts.
    fn on_worker_started(&self, _worker: WorkerId) {}
    /// Called after a worker dequeued `task`, before the simulated work.
    fn on_task_started(&self, _worker: WorkerId, _task: Task) {}
    /// Called after the result for `task` was recorded.
    fn on_task_completed(&self, _worker: WorkerId, _task: Task) {}
    /// Called exactly once when a worker terminates.
    fn on_worker_stopped(&self, _worker: WorkerId, _exit: &WorkerExit) {}
}

/// Stores metrics for the pool using atomic counters.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Tasks that have been dequeued by a worker.
    pub started_tasks: AtomicUsize,
    /// Tasks currently in the simulated work phase.
    pub running_tasks: AtomicUsize,
    /// Tasks whose result has been recorded.
    pub completed_tasks: AtomicUsize,
    /// Worker threads currently alive.
    pub active_workers: AtomicUsize,
    /// Workers that stopped because they were interrupted.
    pub interrupted_workers: AtomicUsize,
    /// Workers that stopped because an iteration failed.
    pub failed_workers: AtomicUsize,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks that were dequeued but never completed.
    pub fn lost_tasks(&self) -> usize {
        self.started_tasks
            .load(Ordering::SeqCst)
            .saturating_sub(self.completed_tasks.load(Ordering::SeqCst))
    }
}

/// A `PoolObserver` that updates a shared `PoolMetrics`.
pub struct MetricsObserver {
    pub metrics: Arc<PoolMetrics>,
}

impl MetricsObserver {
    pub fn new(metrics: Arc<PoolMetrics>) -> Self {
        Self { metrics }
    }
}

impl PoolObserver for MetricsObserver {
    fn on_worker_started(&self, _worker: WorkerId) {
        self.metrics.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_started(&self, _worker: WorkerId, _task: Task) {
        self.metrics.started_tasks.fetch_add(1, Ordering::SeqCst);
        self.metrics.running_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_completed(&self, _worker: WorkerId, _task: Task) {
        self.metrics.running_tasks.fetch_sub(1, Ordering::SeqCst);
        self.metrics.completed_tasks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_worker_stopped(&self, _worker: WorkerId, exit: &WorkerExit) {
        match exit {
            WorkerExit::Interrupted { .. } => {
                saturating_dec(&self.metrics.running_tasks);
                self.metrics.interrupted_workers.fetch_add(1, Ordering::SeqCst);
            }
            WorkerExit::Failed { in_flight, .. } => {
                if in_flight.is_some() {
                    saturating_dec(&self.metrics.running_tasks);
                }
                self.metrics.failed_workers.fetch_add(1, Ordering::SeqCst);
            }
            WorkerExit::Lost { .. } => {
                self.metrics.failed_workers.fetch_add(1, Ordering::SeqCst);
            }
            WorkerExit::Drained { .. } => {}
        }
        saturating_dec(&self.metrics.active_workers);
    }
}

// A hook that panics before this observer ran can leave a counter unbumped.
fn saturating_dec(counter: &AtomicUsize) {
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}
