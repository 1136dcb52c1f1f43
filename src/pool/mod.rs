pub mod task;
mod worker;

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::errors::Result;
use crate::metrics::PoolObserver;
use crate::queue::{ChannelQueue, LockedQueue, TaskQueue};
use crate::results::ResultCollection;
use task::{Task, WorkerId};
use worker::{notify_stopped, Worker};
pub use worker::{WorkerExit, WorkerHandle, WorkerState};

/// Typed builder. The queue backend is part of the type: `LockedQueue` by
/// default, `ChannelQueue` after [`PoolBuilder::channel_queue`].
pub struct PoolBuilder<Q: TaskQueue = LockedQueue> {
    config: PoolConfig,
    observers: Vec<Arc<dyn PoolObserver>>,
    _queue: PhantomData<Q>,
}

impl PoolBuilder<LockedQueue> {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            observers: Vec::new(),
            _queue: PhantomData,
        }
    }

    pub fn channel_queue(self) -> PoolBuilder<ChannelQueue> {
        PoolBuilder {
            config: self.config,
            observers: self.observers,
            _queue: PhantomData,
        }
    }
}

impl Default for PoolBuilder<LockedQueue> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: TaskQueue + Default> PoolBuilder<Q> {
    /// Replaces every setting with `config`. Observers are kept.
    pub fn with_config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = n;
        self
    }

    pub fn work_delay(mut self, delay: Duration) -> Self {
        self.config.work_delay = delay;
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PoolObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> Result<WorkerPool<Q>> {
        self.config.validate()?;
        Ok(WorkerPool {
            config: self.config,
            queue: Arc::new(Q::default()),
            results: Arc::new(ResultCollection::new()),
            observers: Arc::new(self.observers),
        })
    }
}

/// A configured pool whose workers have not started yet. Seed the queue here.
pub struct WorkerPool<Q: TaskQueue> {
    config: PoolConfig,
    queue: Arc<Q>,
    results: Arc<ResultCollection>,
    observers: Arc<Vec<Arc<dyn PoolObserver>>>,
}

impl<Q: TaskQueue> WorkerPool<Q> {
    pub fn enqueue(&self, task: Task) {
        self.queue.enqueue(task);
    }

    /// Enqueues every task in iteration order.
    pub fn seed<I: IntoIterator<Item = Task>>(&self, tasks: I) {
        for task in tasks {
            self.queue.enqueue(task);
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn results(&self) -> &ResultCollection {
        &self.results
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn mode(&self) -> &'static str {
        self.queue.mode()
    }

    /// Starts workers `1..=num_workers`, each on its own thread.
    pub fn start(self) -> Result<RunningPool<Q>> {
        let mut workers = Vec::with_capacity(self.config.num_workers);
        for id in 1..=self.config.num_workers {
            let (worker, interrupt) = Worker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.results),
                self.config.work_delay,
                Arc::clone(&self.observers),
            );
            // On failure the handles spawned so far are dropped, which
            // interrupts those workers at their next pause.
            workers.push(worker.spawn(self.config.thread_name(id), interrupt)?);
        }
        info!(
            workers = workers.len(),
            queued = self.queue.len(),
            mode = self.queue.mode(),
            "worker pool started"
        );

        Ok(RunningPool {
            workers,
            queue: self.queue,
            results: self.results,
            observers: self.observers,
        })
    }
}

/// A pool whose workers are draining the queue.
pub struct RunningPool<Q: TaskQueue> {
    workers: Vec<WorkerHandle>,
    queue: Arc<Q>,
    results: Arc<ResultCollection>,
    observers: Arc<Vec<Arc<dyn PoolObserver>>>,
}

impl<Q: TaskQueue> RunningPool<Q> {
    /// Interrupts one worker's simulated work. Returns `false` if the worker
    /// is unknown or already terminated.
    pub fn interrupt(&self, worker: WorkerId) -> bool {
        self.handle(worker).map_or(false, WorkerHandle::interrupt)
    }

    pub fn worker_state(&self, worker: WorkerId) -> Option<WorkerState> {
        self.handle(worker).map(WorkerHandle::state)
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn results(&self) -> &ResultCollection {
        &self.results
    }

    /// Waits for every worker, with no timeout. A worker that cannot be
    /// joined is logged, reported to the observers and recorded as
    /// `WorkerExit::Lost`; the remaining workers are still waited on.
    pub fn join(mut self) -> PoolReport {
        let mut exits = Vec::with_capacity(self.workers.len());
        for handle in &mut self.workers {
            let exit = handle.join();
            // A lost worker never reached its own exit notification.
            if let WorkerExit::Lost { .. } = exit {
                notify_stopped(&self.observers, handle.id(), &exit);
            }
            debug!(worker = handle.id(), ?exit, "joined worker");
            exits.push((handle.id(), exit));
        }

        let report = PoolReport {
            results: self.results.take(),
            exits,
        };
        info!(
            completed = report.completed(),
            remaining = self.queue.len(),
            "all workers finished"
        );
        report
    }

    fn handle(&self, worker: WorkerId) -> Option<&WorkerHandle> {
        self.workers.iter().find(|h| h.id() == worker)
    }
}

/// Outcome of a run: results in arrival order and each worker's exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolReport {
    pub results: Vec<String>,
    pub exits: Vec<(WorkerId, WorkerExit)>,
}

impl PoolReport {
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn all_drained(&self) -> bool {
        self.exits
            .iter()
            .all(|(_, exit)| matches!(exit, WorkerExit::Drained { .. }))
    }

    pub fn exit_of(&self, worker: WorkerId) -> Option<&WorkerExit> {
        self.exits
            .iter()
            .find(|(id, _)| *id == worker)
            .map(|(_, exit)| exit)
    }
}
