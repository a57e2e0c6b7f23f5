//! Configuration models for the pool and the application.

pub mod app;
pub mod pool;

pub use app::{AppConfig, ConfigError, ConfigSource, LogSection, WorkersSection};
pub use pool::WorkerPoolConfig;
