//! Execution unit: one worker thread pulling jobs from the shared queue.
//!
//! Each worker runs on a dedicated OS thread with its own single-threaded
//! tokio runtime that drives the executor, so a slow job only ever stalls
//! the worker that picked it up.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::core::executor::{Job, JobContext, JobExecutor};
use crate::core::PoolError;

use super::{PoolCounters, WorkerId};

/// Lifecycle of a worker. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, run loop not entered yet.
    Created,
    /// Run loop is consuming jobs.
    Running,
    /// Run loop has exited.
    Stopped,
}

impl WorkerState {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::Running => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// One-shot stop signal. Firing drops the sender, which wakes the run loop.
#[derive(Debug)]
struct StopSignal {
    fired: AtomicBool,
    tx: Mutex<Option<Sender<()>>>,
}

impl StopSignal {
    fn new() -> (Self, Receiver<()>) {
        let (tx, rx) = bounded(0);
        let signal = Self {
            fired: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        };
        (signal, rx)
    }

    fn fire(&self) -> Result<(), PoolError> {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PoolError::AlreadyStopped);
        }
        self.tx.lock().take();
        Ok(())
    }

    fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Cloneable handle used to stop a worker and observe its state.
#[derive(Debug, Clone)]
pub struct StopHandle {
    id: WorkerId,
    signal: Arc<StopSignal>,
    state: Arc<AtomicU8>,
}

impl StopHandle {
    /// Id of the worker this handle controls.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Ask the worker to exit at its next event check.
    ///
    /// A job already in progress finishes first.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::AlreadyStopped` if the worker was already told to stop.
    pub fn stop(&self) -> Result<(), PoolError> {
        self.signal.fire()?;
        debug!(worker_id = self.id, "Stop signal sent");
        Ok(())
    }

    /// Whether `stop` has been called.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.signal.is_fired()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// A single worker that executes jobs received from the shared queue.
pub struct Worker<E: JobExecutor> {
    id: WorkerId,
    jobs: Receiver<Job>,
    stop_rx: Receiver<()>,
    handle: StopHandle,
    executor: E,
    counters: Arc<PoolCounters>,
}

impl<E: JobExecutor> Worker<E> {
    /// Create a worker reading from `jobs`. Allocates the stop signal only.
    #[must_use]
    pub fn new(id: WorkerId, jobs: Receiver<Job>, executor: E) -> Self {
        let (signal, stop_rx) = StopSignal::new();
        Self {
            id,
            jobs,
            stop_rx,
            handle: StopHandle {
                id,
                signal: Arc::new(signal),
                state: Arc::new(AtomicU8::new(WorkerState::Created.as_u8())),
            },
            executor,
            counters: Arc::new(PoolCounters::default()),
        }
    }

    pub(crate) fn with_counters(mut self, counters: Arc<PoolCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Worker id.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Handle that can stop this worker after it has moved onto its thread.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.handle.clone()
    }

    /// Ask the worker to exit at its next event check.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::AlreadyStopped` on a second call.
    pub fn stop(&self) -> Result<(), PoolError> {
        self.handle.stop()
    }

    /// Run the worker loop on the current thread until stopped.
    ///
    /// Waits for either a job or the stop signal. A closed job queue also
    /// ends the loop.
    pub fn run(self) {
        self.set_state(WorkerState::Running);
        info!(worker_id = self.id, "Starting worker");

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(worker_id = self.id, error = %e, "Failed to create worker runtime");
                self.set_state(WorkerState::Stopped);
                return;
            }
        };

        loop {
            if self.handle.is_stop_requested() {
                info!(worker_id = self.id, "Worker stopped with signal");
                break;
            }

            select! {
                recv(self.jobs) -> msg => match msg {
                    Ok(job) => self.process_job(&rt, job),
                    Err(_) => {
                        warn!(worker_id = self.id, "Job queue closed, worker exiting");
                        break;
                    }
                },
                recv(self.stop_rx) -> _ => {
                    info!(worker_id = self.id, "Worker stopped with signal");
                    break;
                }
            }
        }

        self.set_state(WorkerState::Stopped);
    }

    /// Process one job to completion on this worker's runtime.
    fn process_job(&self, rt: &Runtime, job: Job) {
        self.counters.active_jobs.fetch_add(1, Ordering::Relaxed);

        let ctx = JobContext { worker_id: self.id };
        rt.block_on(self.executor.execute(job, ctx));

        self.counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
        self.counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
    }

    /// Move the worker onto a new named OS thread and start its run loop.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Spawn` if the thread cannot be created.
    pub fn spawn(self, thread_name: String, stack_size: usize) -> Result<WorkerHandle, PoolError> {
        let handle = self.stop_handle();
        let thread = thread::Builder::new()
            .name(thread_name)
            .stack_size(stack_size)
            .spawn(move || self.run())
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        Ok(WorkerHandle {
            handle,
            thread: Some(thread),
        })
    }

    fn set_state(&self, state: WorkerState) {
        self.handle.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Owning handle to a spawned worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    handle: StopHandle,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Worker id.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.handle.id
    }

    /// Ask the worker to exit.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::AlreadyStopped` on a second call.
    pub fn stop(&self) -> Result<(), PoolError> {
        self.handle.stop()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.handle.state()
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit. Returns `false` if it panicked.
    pub fn join(&mut self) -> bool {
        let Some(thread) = self.thread.take() else {
            return true;
        };
        match thread.join() {
            Ok(()) => {
                debug!(worker_id = self.id(), "Worker joined");
                true
            }
            Err(_) => {
                warn!(worker_id = self.id(), "Worker panicked");
                false
            }
        }
    }
}
