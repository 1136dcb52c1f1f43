//! Error types for the worker pool.
//!
//! This module defines errors that may occur while configuring, starting and
//! running the pool. Worker-level failures (interruption, panics) are contained
//! by the worker and reported through [`crate::pool::WorkerExit`]; they are
//! described here so they can be logged with a uniform message.

use crate::pool::task::{Task, WorkerId};

/// Represents errors that can occur in the worker pool.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The pool configuration cannot be used to start workers.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// The operating system refused to create a worker thread.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: WorkerId,
        #[source]
        source: std::io::Error,
    },

    /// The simulated work pause was interrupted; the in-flight task is dropped.
    #[error("worker {worker} was interrupted while processing task {task}")]
    Interrupted { worker: WorkerId, task: Task },

    /// A worker iteration panicked.
    #[error("worker {worker} encountered an error: {message}")]
    WorkerPanicked { worker: WorkerId, message: String },

    /// Waiting for a worker thread to finish failed.
    #[error("error waiting for worker {worker} to finish: {message}")]
    JoinFailed { worker: WorkerId, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PoolError {
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PoolError::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_worker() {
        let err = PoolError::Interrupted { worker: 3, task: 7 };
        assert_eq!(
            err.to_string(),
            "worker 3 was interrupted while processing task 7"
        );

        let err = PoolError::WorkerPanicked {
            worker: 2,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "worker 2 encountered an error: boom");
    }

    #[test]
    fn panic_message_handles_str_and_string() {
        let a: Box<dyn std::any::Any + Send> = Box::new("static");
        let b: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(a.as_ref()), "static");
        assert_eq!(panic_message(b.as_ref()), "owned");
        assert_eq!(panic_message(c.as_ref()), "unknown panic");
    }
}
