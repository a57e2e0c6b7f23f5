//! Job execution trait and the default logging executor.

use std::io::Write;

use async_trait::async_trait;
use tracing::info;

use super::WorkerId;

/// A job is an opaque string payload with no identity beyond its content.
pub type Job = String;

/// Context handed to the executor alongside each job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobContext {
    /// Id of the worker processing the job.
    pub worker_id: WorkerId,
}

/// Abstraction for processing a single job on a worker.
///
/// The executor holds the job's business logic. Each worker owns a clone and
/// runs it on the worker's dedicated thread, one job at a time.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use elastic_pool::core::{Job, JobContext, JobExecutor};
///
/// #[derive(Clone)]
/// struct Upcase;
///
/// #[async_trait]
/// impl JobExecutor for Upcase {
///     async fn execute(&self, job: Job, ctx: JobContext) {
///         println!("{}: {}", ctx.worker_id, job.to_uppercase());
///     }
/// }
/// ```
///
/// # Threading
///
/// `execute` is driven by the worker's own single-threaded tokio runtime, so
/// blocking inside it stalls only that worker.
#[async_trait]
pub trait JobExecutor: Send + Sync + Clone + 'static {
    /// Process one job. Jobs cannot fail and produce no result.
    async fn execute(&self, job: Job, ctx: JobContext);
}

/// Executor that logs every job and optionally echoes it to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingExecutor {
    echo: bool,
}

impl LoggingExecutor {
    /// Create a logging executor that does not echo to stdout.
    #[must_use]
    pub const fn new() -> Self {
        Self { echo: false }
    }

    /// Also print `Worker <id> processing job <job>` to stdout.
    #[must_use]
    pub const fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

#[async_trait]
impl JobExecutor for LoggingExecutor {
    async fn execute(&self, job: Job, ctx: JobContext) {
        info!(worker_id = ctx.worker_id, job = %job, "Processing job");

        if self.echo {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "Worker {} processing job {job}", ctx.worker_id);
        }

        info!(worker_id = ctx.worker_id, job = %job, "Processed job");
    }
}
