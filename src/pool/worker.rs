//! Worker logic for the pool

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, error, warn};

use super::task::{result_line, Task, WorkerId};
use crate::errors::{panic_message, PoolError};
use crate::metrics::PoolObserver;
use crate::queue::TaskQueue;
use crate::results::ResultCollection;

/// Lifecycle of a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Processing,
    Terminated,
}

/// Why a worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// `dequeue` returned `None`.
    Drained { completed: usize },
    /// The work pause was interrupted. `dropped` is never requeued.
    Interrupted { completed: usize, dropped: Task },
    /// An iteration panicked.
    Failed {
        completed: usize,
        in_flight: Option<Task>,
        message: String,
    },
    /// The worker thread could not be joined.
    Lost { message: String },
}

impl WorkerExit {
    /// Number of results this worker recorded, when known.
    pub fn completed(&self) -> usize {
        match self {
            WorkerExit::Drained { completed }
            | WorkerExit::Interrupted { completed, .. }
            | WorkerExit::Failed { completed, .. } => *completed,
            WorkerExit::Lost { .. } => 0,
        }
    }
}

/// Shared, lock-free view of a worker's state.
#[derive(Debug, Clone)]
pub(crate) struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(0)))
    }

    fn set(&self, state: WorkerState) {
        let raw = match state {
            WorkerState::Running => 0,
            WorkerState::Processing => 1,
            WorkerState::Terminated => 2,
        };
        self.0.store(raw, Ordering::Release);
    }

    pub(crate) fn get(&self) -> WorkerState {
        match self.0.load(Ordering::Acquire) {
            0 => WorkerState::Running,
            1 => WorkerState::Processing,
            _ => WorkerState::Terminated,
        }
    }
}

pub struct WorkerHandle {
    id: WorkerId,
    thread: Option<thread::JoinHandle<WorkerExit>>,
    interrupt: Sender<()>,
    state: StateCell,
}

impl WorkerHandle {
    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Signals the worker. The signal is consumed by the worker's next (or
    /// current) work pause; a worker that finds the queue empty ignores it.
    pub fn interrupt(&self) -> bool {
        if self.state.get() == WorkerState::Terminated {
            return false;
        }
        match self.interrupt.try_send(()) {
            Ok(()) => true,
            // Already pending.
            Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_thread(id: WorkerId, thread: thread::JoinHandle<WorkerExit>) -> Self {
        let (interrupt, _) = bounded(1);
        Self {
            id,
            thread: Some(thread),
            interrupt,
            state: StateCell::new(),
        }
    }

    /// Blocks until the worker thread has terminated.
    pub fn join(&mut self) -> WorkerExit {
        let Some(handle) = self.thread.take() else {
            return WorkerExit::Lost {
                message: "worker already joined".to_string(),
            };
        };
        match handle.join() {
            Ok(exit) => exit,
            Err(payload) => {
                let err = PoolError::JoinFailed {
                    worker: self.id,
                    message: panic_message(payload.as_ref()),
                };
                error!(worker = self.id, "{}", err);
                self.state.set(WorkerState::Terminated);
                WorkerExit::Lost {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Everything a worker needs; moved onto its thread.
pub(crate) struct Worker<Q: TaskQueue> {
    id: WorkerId,
    queue: Arc<Q>,
    results: Arc<ResultCollection>,
    work_delay: Duration,
    observers: Arc<Vec<Arc<dyn PoolObserver>>>,
    interrupt: Receiver<()>,
    state: StateCell,
    completed: usize,
    in_flight: Option<Task>,
}

impl<Q: TaskQueue> Worker<Q> {
    pub(crate) fn new(
        id: WorkerId,
        queue: Arc<Q>,
        results: Arc<ResultCollection>,
        work_delay: Duration,
        observers: Arc<Vec<Arc<dyn PoolObserver>>>,
    ) -> (Self, Sender<()>) {
        // One slot: a second interrupt before the first is consumed is a no-op.
        let (tx, rx) = bounded(1);
        let worker = Self {
            id,
            queue,
            results,
            work_delay,
            observers,
            interrupt: rx,
            state: StateCell::new(),
            completed: 0,
            in_flight: None,
        };
        (worker, tx)
    }

    /// Spawns the worker on a named thread.
    pub(crate) fn spawn(
        self,
        name: String,
        interrupt: Sender<()>,
    ) -> crate::errors::Result<WorkerHandle> {
        let id = self.id;
        let state = self.state.clone();
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
            .map_err(|source| PoolError::Spawn { worker: id, source })?;
        Ok(WorkerHandle {
            id,
            thread: Some(handle),
            interrupt,
            state,
        })
    }

    /// Worker thread main loop. Never panics; every way out is a `WorkerExit`.
    pub(crate) fn run(mut self) -> WorkerExit {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.drain()));

        let exit = match outcome {
            Ok(Ok(())) => WorkerExit::Drained {
                completed: self.completed,
            },
            Ok(Err(Interrupted(task))) => {
                let err = PoolError::Interrupted {
                    worker: self.id,
                    task,
                };
                warn!(worker = self.id, task = task, "{}", err);
                WorkerExit::Interrupted {
                    completed: self.completed,
                    dropped: task,
                }
            }
            Err(payload) => {
                let err = PoolError::WorkerPanicked {
                    worker: self.id,
                    message: panic_message(payload.as_ref()),
                };
                error!(worker = self.id, "{}", err);
                WorkerExit::Failed {
                    completed: self.completed,
                    in_flight: self.in_flight.take(),
                    message: err.to_string(),
                }
            }
        };

        self.state.set(WorkerState::Terminated);
        debug!(worker = self.id, ?exit, "worker terminated");

        notify_stopped(&self.observers, self.id, &exit);
        exit
    }

    /// Runs until `dequeue` returns `None`. The only error is an interrupted pause.
    fn drain(&mut self) -> Result<(), Interrupted> {
        let id = self.id;
        self.observers.iter().for_each(|o| o.on_worker_started(id));
        debug!(worker = id, queue = self.queue.mode(), "worker started");

        // `None` from `dequeue` is the only termination signal.
        while let Some(task) = self.queue.dequeue() {
            self.in_flight = Some(task);
            self.state.set(WorkerState::Processing);
            self.observers.iter().for_each(|o| o.on_task_started(id, task));

            self.simulate_work(task)?;

            self.results.append(result_line(id, task));
            self.completed += 1;
            self.in_flight = None;
            self.observers.iter().for_each(|o| o.on_task_completed(id, task));
            self.state.set(WorkerState::Running);
        }
        Ok(())
    }

    /// Waits `work_delay` unless an interrupt arrives first.
    fn simulate_work(&self, task: Task) -> Result<(), Interrupted> {
        match self.interrupt.recv_timeout(self.work_delay) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            // The handle was dropped without a join; nobody will wait for us.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(Interrupted(task)),
        }
    }
}

/// The pause for this task was interrupted.
struct Interrupted(Task);

/// Reports `exit` to every observer. A panicking observer is logged and does
/// not keep the others from being called.
pub(crate) fn notify_stopped(
    observers: &[Arc<dyn PoolObserver>],
    worker: WorkerId,
    exit: &WorkerExit,
) {
    for observer in observers {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| {
            observer.on_worker_stopped(worker, exit)
        })) {
            error!(
                worker = worker,
                "observer panicked while reporting worker exit: {}",
                panic_message(payload.as_ref())
            );
        }
    }
}
