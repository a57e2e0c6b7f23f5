//! Interactive console driving a worker pool from line-based input.

use std::io::{BufRead, Write};

use tracing::{error, info, warn};

use crate::core::{AppResult, JobExecutor, PoolError, WorkerPool};

use super::command::Command;

/// Prompt written before each line is read.
pub const PROMPT: &str = "Enter a command or job > ";

/// Whether the console keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Stop reading.
    Exit,
}

/// Apply one command to the pool.
///
/// # Errors
///
/// Returns the pool error for add, remove or submit; `exit` on an already
/// shut down pool is not an error.
pub fn dispatch<E: JobExecutor>(pool: &WorkerPool<E>, command: Command) -> Result<Flow, PoolError> {
    match command {
        Command::Empty => {}
        Command::AddWorker => {
            let id = pool.request_add_worker()?;
            info!(worker_id = id, worker_count = pool.worker_count(), "Added new worker");
        }
        Command::RemoveWorker => match pool.request_remove_worker()? {
            Some(id) => info!(worker_id = id, worker_count = pool.worker_count(), "Removed worker"),
            None => info!("No workers to remove"),
        },
        Command::Submit(job) => {
            info!(job = %job, "Submitting new job to pool");
            pool.submit_job(job)?;
        }
        Command::Exit => {
            info!("Exiting worker pool console");
            close_pool(pool)?;
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// Read commands from `input` until `exit`, end of input or a read error.
///
/// The pool is shut down before returning in every case. Pool errors on
/// individual commands are logged and the loop continues; an unreadable line
/// is logged and ends the session.
///
/// # Errors
///
/// Returns an error if writing the prompt fails.
pub fn run_console<E, R, W>(pool: &WorkerPool<E>, input: R, mut output: W) -> AppResult<()>
where
    E: JobExecutor,
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        if let Err(e) = write!(output, "{PROMPT}").and_then(|()| output.flush()) {
            close_pool(pool)?;
            return Err(e.into());
        }

        let Some(line) = lines.next() else {
            info!("End of input, shutting down");
            break;
        };

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Failed to read input, shutting down");
                break;
            }
        };

        match dispatch(pool, Command::parse(&line)) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => warn!(error = %e, "Command failed"),
        }
    }

    close_pool(pool)?;
    Ok(())
}

fn close_pool<E: JobExecutor>(pool: &WorkerPool<E>) -> Result<(), PoolError> {
    match pool.shutdown() {
        Ok(()) | Err(PoolError::AlreadyStopped) => Ok(()),
        Err(e) => Err(e),
    }
}
