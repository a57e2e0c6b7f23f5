//! Error types for pool and worker operations.

use thiserror::Error;

/// Errors produced by the worker pool and its execution units.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A construction argument was out of range (e.g. negative worker count).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The worker or pool has already been stopped.
    #[error("already stopped")]
    AlreadyStopped,
    /// The management loop has already been started.
    #[error("management loop already started")]
    AlreadyStarted,
    /// The pool has been shut down.
    #[error("pool has been shut down")]
    PoolShutdown,
    /// No worker accepted the job before the deadline.
    #[error("operation timed out")]
    Timeout,
    /// An OS thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
