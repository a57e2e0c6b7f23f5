//! Worker pool construction settings.

use serde::{Deserialize, Serialize};

use crate::core::PoolError;

/// Default number of workers started with the pool.
pub const DEFAULT_INITIAL_WORKERS: i64 = 10;

/// Default stack size for worker threads (2 MiB).
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;

/// Default prefix for worker thread names.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "pool-worker";

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Workers started at construction. Signed so that bad input from
    /// configuration can be reported instead of wrapping.
    pub initial_workers: i64,
    /// Stack size for each worker thread, in bytes.
    pub thread_stack_size: usize,
    /// Worker threads are named `<prefix>-<id>`.
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            initial_workers: DEFAULT_INITIAL_WORKERS,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers started at construction.
    #[must_use]
    pub const fn with_initial_workers(mut self, count: i64) -> Self {
        self.initial_workers = count;
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, bytes: usize) -> Self {
        self.thread_stack_size = bytes;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_workers < 0 {
            return Err(format!(
                "initial worker count must be >= 0, got {}",
                self.initial_workers
            ));
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Initial worker count as an unsigned value.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::InvalidArgument` if the count is negative.
    pub fn initial_worker_count(&self) -> Result<usize, PoolError> {
        usize::try_from(self.initial_workers).map_err(|_| {
            PoolError::InvalidArgument(format!(
                "initial worker count must be >= 0, got {}",
                self.initial_workers
            ))
        })
    }
}
