//! # taskpool
//!
//! `taskpool` is a fixed-size worker pool: a bounded set of worker threads
//! drains a shared queue of integer task identifiers, simulates processing,
//! and appends a result string to a shared collection.
//!
//! ## Features
//! - Competing consumers on one shared FIFO queue.
//! - Two queue backends: a mutex-guarded deque and a pre-filled channel.
//! - Workers stop exactly when `dequeue` reports the queue empty.
//! - Per-worker interruption of the simulated work.
//! - Worker failures are contained, logged and reported per worker.
//! - Observer hooks and atomic metrics.
//!
//! ## Usage
//!
//! ### Basic Usage
//! ```rust
//! use std::time::Duration;
//! use taskpool::PoolBuilder;
//!
//! let pool = PoolBuilder::new()
//!     .num_workers(5)
//!     .work_delay(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//!
//! pool.seed(1..=20);
//! let report = pool.start().unwrap().join();
//!
//! assert_eq!(report.completed(), 20);
//! assert!(report.all_drained());
//! ```
//!
//! ### Channel Queue
//! ```rust
//! use std::time::Duration;
//! use taskpool::PoolBuilder;
//!
//! let pool = PoolBuilder::new()
//!     .channel_queue()
//!     .work_delay(Duration::ZERO)
//!     .build()
//!     .unwrap();
//!
//! pool.seed(1..=8);
//! let report = pool.start().unwrap().join();
//! assert_eq!(report.completed(), 8);
//! ```
//!
//! ### Collecting Metrics
//! ```rust
//! use std::sync::{atomic::Ordering, Arc};
//! use std::time::Duration;
//! use taskpool::{metrics::{MetricsObserver, PoolMetrics}, PoolBuilder};
//!
//! let metrics = Arc::new(PoolMetrics::new());
//! let pool = PoolBuilder::new()
//!     .work_delay(Duration::ZERO)
//!     .with_observer(Arc::new(MetricsObserver::new(metrics.clone())))
//!     .build()
//!     .unwrap();
//!
//! pool.seed(1..=10);
//! pool.start().unwrap().join();
//!
//! assert_eq!(metrics.completed_tasks.load(Ordering::SeqCst), 10);
//! assert_eq!(metrics.active_workers.load(Ordering::SeqCst), 0);
//! ```
//!
//! ### Running the Driver
//! ```rust
//! use std::time::Duration;
//! use taskpool::{driver, PoolConfig};
//!
//! let config = PoolConfig {
//!     work_delay: Duration::ZERO,
//!     ..PoolConfig::default()
//! };
//! let mut out = Vec::new();
//! let report = driver::run(config, Vec::new(), &mut out).unwrap();
//!
//! let printed = String::from_utf8(out).unwrap();
//! assert_eq!(report.completed(), 20);
//! assert_eq!(printed.lines().last(), Some("All tasks completed."));
//! ```

pub mod config;
pub mod driver;
mod errors;
pub mod metrics;
pub mod pool;
pub mod queue;
pub mod results;

pub use config::PoolConfig;
pub use errors::{PoolError, Result};
pub use metrics::PoolObserver;
pub use pool::task::{Task, WorkerId};
pub use pool::{PoolBuilder, PoolReport, RunningPool, WorkerExit, WorkerPool, WorkerState};
pub use queue::{ChannelQueue, LockedQueue, TaskQueue};
pub use results::ResultCollection;
