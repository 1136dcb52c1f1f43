//! Task abstraction for the worker pool.

/// A task is a bare integer identifier.
pub type Task = u32;

/// Worker identities start at 1.
pub type WorkerId = usize;

/// Builds the result string a worker records after finishing `task`.
pub fn result_line(worker: WorkerId, task: Task) -> String {
    format!("Worker {} completed task {}", worker, task)
}

/// Builds the line emitted when a worker picks up `task`.
pub fn started_line(worker: WorkerId, task: Task) -> String {
    format!("Worker {} started task {}", worker, task)
}

/// Sequential task identifiers `1..=count`.
pub fn sequential_tasks(count: u32) -> impl Iterator<Item = Task> {
    1..=count
}
