//! # Elastic Pool
//!
//! A dynamically resizable worker pool for string jobs.
//!
//! The pool owns a set of worker threads that take jobs from one shared
//! rendezvous queue. Workers can be added or removed while the pool is
//! running, and the whole pool can be shut down without abandoning a job a
//! worker has already taken or leaving threads behind.
//!
//! ## Key Features
//!
//! - **Runtime resizing**: add a worker, or remove the newest one, at any time
//! - **Single management loop**: all membership changes after construction
//!   are serialized through one thread
//! - **Synchronous hand-off**: a submit returns once a worker has the job
//! - **Idempotency guards**: double stop and double shutdown are reported as
//!   `PoolError::AlreadyStopped` instead of crashing
//! - **Pluggable executor**: job processing is a `JobExecutor` implementation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use elastic_pool::config::WorkerPoolConfig;
//! use elastic_pool::core::{LoggingExecutor, WorkerPool};
//!
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new().with_initial_workers(4),
//!     LoggingExecutor::new(),
//! )?;
//! pool.start()?;
//!
//! pool.submit_job("hello")?;
//! pool.request_add_worker()?;
//! pool.request_remove_worker()?;
//! pool.shutdown()?;
//! ```
//!
//! The `worker-pool` binary wraps the pool in an interactive console; see
//! `runtime::console`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Worker pool, execution units and job executors.
pub mod core;
/// Configuration models for the pool and the application.
pub mod config;
/// Builders to construct pools from configuration.
pub mod builders;
/// Interactive console front-end.
pub mod runtime;
/// Shared utilities.
pub mod util;
