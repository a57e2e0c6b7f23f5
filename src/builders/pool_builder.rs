//! Builders to construct worker pools from application configuration.

use crate::config::AppConfig;
use crate::core::{JobExecutor, LoggingExecutor, PoolError, WorkerPool};

/// Build a worker pool from application configuration with a custom executor.
///
/// # Errors
///
/// Returns `PoolError::InvalidArgument` if the configuration is invalid, or
/// any error from [`WorkerPool::new`].
pub fn build_pool<E: JobExecutor>(cfg: &AppConfig, executor: E) -> Result<WorkerPool<E>, PoolError> {
    cfg.validate()
        .map_err(|e| PoolError::InvalidArgument(format!("config invalid: {e}")))?;
    WorkerPool::new(cfg.pool_config(), executor)
}

/// Build a worker pool whose jobs are logged (and echoed if configured).
///
/// # Errors
///
/// As [`build_pool`].
pub fn build_logging_pool(cfg: &AppConfig) -> Result<WorkerPool<LoggingExecutor>, PoolError> {
    build_pool(cfg, LoggingExecutor::new().with_echo(cfg.log.echo_jobs))
}
