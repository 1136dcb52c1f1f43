use std::time::Duration;

use crate::errors::{PoolError, Result};

pub const DEFAULT_NUM_WORKERS: usize = 5;
pub const DEFAULT_TASK_COUNT: u32 = 20;
pub const DEFAULT_WORK_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub num_workers: usize,
    /// Tasks `1..=task_count` are seeded by the driver.
    pub task_count: u32,
    /// Fixed simulated processing time per task.
    pub work_delay: Duration,
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_NUM_WORKERS,
            task_count: DEFAULT_TASK_COUNT,
            work_delay: DEFAULT_WORK_DELAY,
            thread_name_prefix: "worker".to_string(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(PoolError::invalid_config("num_workers must be at least 1"));
        }
        if self.thread_name_prefix.contains('\0') {
            return Err(PoolError::invalid_config(
                "thread_name_prefix must not contain NUL bytes",
            ));
        }
        Ok(())
    }

    pub fn thread_name(&self, worker: usize) -> String {
        format!("{}-{}", self.thread_name_prefix, worker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let config = PoolConfig::default();
        assert_eq!(config.num_workers, 5);
        assert_eq!(config.task_count, 20);
        assert_eq!(config.work_delay, Duration::from_secs(1));
        assert!(config.validate().is_ok());
        assert_eq!(config.thread_name(3), "worker-3");
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = PoolConfig {
            num_workers: 0,
            ..PoolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PoolError::InvalidConfig(_))
        ));
    }
}
