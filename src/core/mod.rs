//! Worker pool, execution units and the job executor abstraction.

pub mod error;
pub mod executor;
pub mod worker_pool;

pub use error::{AppResult, PoolError};
pub use executor::{Job, JobContext, JobExecutor, LoggingExecutor};
pub use worker_pool::{
    PoolStats, StopHandle, Worker, WorkerHandle, WorkerId, WorkerPool, WorkerState,
};
