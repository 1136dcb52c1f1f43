//! Seeds the queue, runs the pool to completion and prints the results.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::config::PoolConfig;
use crate::errors::Result;
use crate::metrics::PoolObserver;
use crate::pool::task::{result_line, sequential_tasks, started_line, Task, WorkerId};
use crate::pool::{PoolBuilder, PoolReport, WorkerPool};
use crate::queue::TaskQueue;

pub const RESULTS_HEADER: &str = "Results of tasks:";
pub const COMPLETION_MARKER: &str = "All tasks completed.";

/// Prints per-task `started` and `completed` lines as workers progress.
pub struct ConsoleObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    fn line(&self, line: String) {
        let mut out = self.out.lock();
        if let Err(err) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            debug!(%err, "failed to write progress line");
        }
    }
}

impl PoolObserver for ConsoleObserver {
    fn on_task_started(&self, worker: WorkerId, task: Task) {
        self.line(started_line(worker, task));
    }

    fn on_task_completed(&self, worker: WorkerId, task: Task) {
        self.line(result_line(worker, task));
    }
}

/// Writes the results block: a blank line, the header, one line per result,
/// then the completion marker.
pub fn print_results<W: Write>(results: &[String], out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RESULTS_HEADER)?;
    for result in results {
        writeln!(out, "{}", result)?;
    }
    writeln!(out, "{}", COMPLETION_MARKER)?;
    out.flush()
}

/// Starts the workers of an already seeded pool, waits for all of them and
/// prints the results to `out`.
pub fn run_pool<Q: TaskQueue, W: Write>(pool: WorkerPool<Q>, out: &mut W) -> Result<PoolReport> {
    let report = pool.start()?.join();
    print_results(&report.results, out)?;
    Ok(report)
}

/// Seeds `1..=task_count` into the locked-queue pool described by `config`
/// and runs it.
pub fn run<W: Write>(
    config: PoolConfig,
    observers: Vec<Arc<dyn PoolObserver>>,
    out: &mut W,
) -> Result<PoolReport> {
    let task_count = config.task_count;
    let pool = observers
        .into_iter()
        .fold(PoolBuilder::new().with_config(config), PoolBuilder::with_observer)
        .build()?;
    pool.seed(sequential_tasks(task_count));
    run_pool(pool, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_block_layout() {
        let mut out = Vec::new();
        let results = vec![
            "Worker 2 completed task 1".to_string(),
            "Worker 1 completed task 2".to_string(),
        ];
        print_results(&results, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nResults of tasks:\nWorker 2 completed task 1\nWorker 1 completed task 2\nAll tasks completed.\n"
        );
    }

    #[test]
    fn empty_results_block() {
        let mut out = Vec::new();
        print_results(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\nResults of tasks:\nAll tasks completed.\n"
        );
    }
}
