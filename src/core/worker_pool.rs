//! Dynamically resizable worker pool backed by dedicated OS threads.
//!
//! The pool owns a set of workers that pull jobs from one shared rendezvous
//! channel. A single management loop serializes membership changes: callers
//! request an extra worker, the removal of the newest worker, or shutdown,
//! and the loop applies each request in turn.
//!
//! # Key Features
//!
//! - **Synchronous hand-off**: `submit_job` returns once a worker has taken the job
//! - **Stable ids**: workers are numbered from 1 and ids are never reused
//! - **Newest-first removal**: `request_remove_worker` evicts the highest id
//! - **Clean shutdown**: every worker is stopped before the job queue closes
//!
//! # Example
//!
//! ```rust,ignore
//! use elastic_pool::config::WorkerPoolConfig;
//! use elastic_pool::core::{LoggingExecutor, WorkerPool};
//!
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new().with_initial_workers(2),
//!     LoggingExecutor::new(),
//! )?;
//! pool.start()?;
//!
//! let id = pool.request_add_worker()?; // 3
//! pool.submit_job("resize image")?;
//! pool.request_remove_worker()?;       // Some(3)
//! pool.shutdown()?;
//! ```

mod controller;
mod worker;

use std::sync::atomic::{AtomicU64, Ordering};

pub use controller::WorkerPool;
pub use worker::{StopHandle, Worker, WorkerHandle, WorkerState};

/// Identifier of a worker. Assigned from 1 upwards and never reused.
pub type WorkerId = u64;

/// Snapshot of pool membership and job throughput.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of live workers.
    pub worker_count: usize,

    /// Id the next added worker will receive.
    pub next_worker_id: WorkerId,

    /// Jobs handed to a worker.
    pub submitted_jobs: u64,

    /// Jobs a worker has finished processing.
    pub completed_jobs: u64,

    /// Jobs currently being processed.
    pub active_jobs: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub active_jobs: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize, next_worker_id: WorkerId) -> PoolStats {
        PoolStats {
            worker_count,
            next_worker_id,
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
        }
    }
}
