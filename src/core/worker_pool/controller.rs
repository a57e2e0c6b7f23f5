//! Pool controller: worker membership, job hand-off and the management loop.
//!
//! # Design
//!
//! - **Rendezvous queue**: jobs travel over a zero-capacity channel, so a
//!   submit completes only when a worker takes the job
//! - **Single arbiter**: after construction, only the management loop adds
//!   or removes workers
//! - **Ordered teardown**: workers are told to stop before the queue closes;
//!   blocked submitters then fail with `PoolShutdown`

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, SendTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::executor::{Job, JobExecutor};
use crate::core::PoolError;

use super::worker::{Worker, WorkerHandle};
use super::{PoolCounters, PoolStats, WorkerId};

/// Reply slot carried by a control request.
type Reply<T> = Sender<T>;

/// Unit map and id counter, guarded together.
#[derive(Debug)]
struct Registry {
    workers: BTreeMap<WorkerId, WorkerHandle>,
    next_id: WorkerId,
}

/// Receiving ends of the control channels, owned by the management loop.
struct ControlReceivers {
    add: Receiver<Reply<Result<WorkerId, PoolError>>>,
    remove: Receiver<Reply<Option<WorkerId>>>,
    shutdown: Receiver<()>,
}

/// State shared between the pool handle and the management loop.
struct Shared<E: JobExecutor> {
    config: WorkerPoolConfig,
    executor: E,
    registry: Mutex<Registry>,
    /// Workers that were stopped but whose threads have not been joined.
    retired: Mutex<Vec<WorkerHandle>>,
    job_tx: Mutex<Option<Sender<Job>>>,
    job_rx: Mutex<Option<Receiver<Job>>>,
    queue_closed: AtomicBool,
    counters: Arc<PoolCounters>,
}

impl<E: JobExecutor> Shared<E> {
    /// Create, register and start one worker with the next id.
    ///
    /// The registry lock is taken only to reserve the id and to insert the
    /// handle; the thread is spawned outside it. An id whose spawn fails is
    /// not handed out again.
    fn add_worker(&self) -> Result<WorkerId, PoolError> {
        let jobs = self.job_rx.lock().clone().ok_or(PoolError::PoolShutdown)?;

        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            id
        };

        let worker = Worker::new(id, jobs, self.executor.clone())
            .with_counters(Arc::clone(&self.counters));
        let handle = worker.spawn(
            format!("{}-{id}", self.config.thread_name_prefix),
            self.config.thread_stack_size,
        )?;

        let mut registry = self.registry.lock();
        // stop_all_workers sets the flag before draining under this lock.
        if self.queue_closed.load(Ordering::Acquire) {
            drop(registry);
            if let Err(e) = handle.stop() {
                warn!(worker_id = id, error = %e, "Worker was already stopped");
            }
            self.retired.lock().push(handle);
            return Err(PoolError::PoolShutdown);
        }
        registry.workers.insert(id, handle);

        debug!(worker_id = id, worker_count = registry.workers.len(), "Worker added");
        Ok(id)
    }

    /// Stop and evict the worker with the highest id. No-op on an empty pool.
    fn pop_worker(&self) -> Option<WorkerId> {
        let popped = self.registry.lock().workers.pop_last();
        let Some((id, handle)) = popped else {
            info!("No workers left to remove");
            return None;
        };

        if let Err(e) = handle.stop() {
            warn!(worker_id = id, error = %e, "Worker was already stopped");
        }

        let mut retired = self.retired.lock();
        retired.retain_mut(|h| {
            if h.is_finished() {
                h.join();
                return false;
            }
            true
        });
        retired.push(handle);

        info!(worker_id = id, "Worker removed");
        Some(id)
    }

    /// Stop every worker, then close the job queue. Runs at most once.
    fn stop_all_workers(&self) {
        if self
            .queue_closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let drained = std::mem::take(&mut self.registry.lock().workers);
        info!(worker_count = drained.len(), "Stopping all workers");

        let mut retired = self.retired.lock();
        for (id, handle) in drained {
            if let Err(e) = handle.stop() {
                warn!(worker_id = id, error = %e, "Worker was already stopped");
            }
            retired.push(handle);
        }
        drop(retired);
        info!("All workers are stopped");

        self.job_tx.lock().take();
        self.job_rx.lock().take();
    }

    /// Join every stopped worker thread.
    fn join_workers(&self) {
        let mut retired = std::mem::take(&mut *self.retired.lock());
        for handle in &mut retired {
            handle.join();
        }
    }
}

/// Dynamically resizable pool of worker threads.
///
/// Construction starts the initial workers; `start` launches the management
/// loop that serves `request_add_worker`, `request_remove_worker` and
/// `shutdown`.
pub struct WorkerPool<E: JobExecutor> {
    shared: Arc<Shared<E>>,

    add_tx: Sender<Reply<Result<WorkerId, PoolError>>>,
    remove_tx: Sender<Reply<Option<WorkerId>>>,

    /// Dropped (never sent on) to signal shutdown.
    shutdown_tx: Mutex<Option<Sender<()>>>,

    /// Held until `start` hands them to the management loop.
    control_rx: Mutex<Option<ControlReceivers>>,

    manager: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    shut_down: AtomicBool,
}

impl<E: JobExecutor> WorkerPool<E> {
    /// Create a pool and synchronously start its initial workers
    /// (ids `1..=initial_workers`).
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidArgument` if the configuration is invalid
    ///   (e.g. a negative initial worker count)
    /// - `PoolError::Spawn` if a worker thread cannot be created
    pub fn new(config: WorkerPoolConfig, executor: E) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidArgument)?;
        let initial_workers = config.initial_worker_count()?;

        let (job_tx, job_rx) = bounded::<Job>(0);
        let (add_tx, add_rx) = bounded(0);
        let (remove_tx, remove_rx) = bounded(0);
        let (shutdown_tx, shutdown_rx) = bounded(0);

        let shared = Arc::new(Shared {
            config,
            executor,
            registry: Mutex::new(Registry {
                workers: BTreeMap::new(),
                next_id: 1,
            }),
            retired: Mutex::new(Vec::new()),
            job_tx: Mutex::new(Some(job_tx)),
            job_rx: Mutex::new(Some(job_rx)),
            queue_closed: AtomicBool::new(false),
            counters: Arc::new(PoolCounters::default()),
        });

        info!(initial_workers, "Creating worker pool");

        for _ in 0..initial_workers {
            if let Err(e) = shared.add_worker() {
                shared.stop_all_workers();
                shared.join_workers();
                return Err(e);
            }
        }

        Ok(Self {
            shared,
            add_tx,
            remove_tx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            control_rx: Mutex::new(Some(ControlReceivers {
                add: add_rx,
                remove: remove_rx,
                shutdown: shutdown_rx,
            })),
            manager: Mutex::new(None),
            started: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Create a pool with `initial_workers` workers and default settings.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidArgument` if `initial_workers` does not fit in
    ///   an `i64`
    /// - `PoolError::Spawn` if a worker thread cannot be created
    pub fn with_workers(initial_workers: usize, executor: E) -> Result<Self, PoolError> {
        let count = i64::try_from(initial_workers).map_err(|_| {
            PoolError::InvalidArgument(format!("initial worker count too large: {initial_workers}"))
        })?;
        Self::new(WorkerPoolConfig::new().with_initial_workers(count), executor)
    }

    /// Launch the management loop on its own thread. Does not block.
    ///
    /// # Errors
    ///
    /// - `PoolError::AlreadyStarted` on a second call
    /// - `PoolError::PoolShutdown` if the pool has been shut down
    /// - `PoolError::Spawn` if the thread cannot be created
    pub fn start(&self) -> Result<(), PoolError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(PoolError::AlreadyStarted);
        }

        let mut manager = self.manager.lock();
        let Some(control) = self.control_rx.lock().take() else {
            return Err(PoolError::PoolShutdown);
        };

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("pool-manager".into())
            .spawn(move || manage(&shared, &control))
            .map_err(|e| PoolError::Spawn(e.to_string()))?;

        *manager = Some(handle);
        Ok(())
    }

    /// Ask the management loop for one more worker and wait for it to start.
    ///
    /// Blocks until the loop accepts the request; before `start` this means
    /// waiting for the loop to be launched.
    ///
    /// # Returns
    ///
    /// The id of the new worker.
    ///
    /// # Errors
    ///
    /// - `PoolError::PoolShutdown` if the pool has been shut down
    /// - `PoolError::Spawn` if the worker thread cannot be created
    pub fn request_add_worker(&self) -> Result<WorkerId, PoolError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }
        let (reply_tx, reply_rx) = bounded(1);
        self.add_tx
            .send(reply_tx)
            .map_err(|_| PoolError::PoolShutdown)?;
        reply_rx.recv().map_err(|_| PoolError::PoolShutdown)?
    }

    /// Ask the management loop to stop and evict the newest worker.
    ///
    /// # Returns
    ///
    /// The id of the removed worker, or `None` if the pool was empty.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::PoolShutdown` if the pool has been shut down.
    pub fn request_remove_worker(&self) -> Result<Option<WorkerId>, PoolError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }
        let (reply_tx, reply_rx) = bounded(1);
        self.remove_tx
            .send(reply_tx)
            .map_err(|_| PoolError::PoolShutdown)?;
        reply_rx.recv().map_err(|_| PoolError::PoolShutdown)
    }

    /// Hand a job to the next free worker, blocking until one takes it.
    ///
    /// With no live worker the caller waits until one is added or the pool
    /// shuts down.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::PoolShutdown` if the pool is or becomes shut down
    /// before a worker takes the job.
    pub fn submit_job(&self, job: impl Into<Job>) -> Result<(), PoolError> {
        let job_tx = self.job_sender()?;
        job_tx.send(job.into()).map_err(|_| PoolError::PoolShutdown)?;
        self.record_submitted();
        Ok(())
    }

    /// Like `submit_job`, but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// - `PoolError::Timeout` if no worker took the job in time
    /// - `PoolError::PoolShutdown` if the pool is shut down
    pub fn submit_job_timeout(&self, job: impl Into<Job>, timeout: Duration) -> Result<(), PoolError> {
        let job_tx = self.job_sender()?;
        match job_tx.send_timeout(job.into(), timeout) {
            Ok(()) => {
                self.record_submitted();
                Ok(())
            }
            Err(SendTimeoutError::Timeout(_)) => Err(PoolError::Timeout),
            Err(SendTimeoutError::Disconnected(_)) => Err(PoolError::PoolShutdown),
        }
    }

    /// Stop every worker, close the job queue and wait for all threads.
    ///
    /// If the management loop is running it performs the teardown; otherwise
    /// it happens on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::AlreadyStopped` on a second call; nothing is done.
    pub fn shutdown(&self) -> Result<(), PoolError> {
        if self
            .shut_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PoolError::AlreadyStopped);
        }

        info!("Shutting down worker pool");

        let unstarted = self.control_rx.lock().take();
        if unstarted.is_some() {
            drop(unstarted);
            self.shared.stop_all_workers();
        } else {
            self.shutdown_tx.lock().take();
            let manager = self.manager.lock().take();
            match manager {
                Some(manager) => {
                    if manager.join().is_err() {
                        error!("Pool management loop panicked");
                        self.shared.stop_all_workers();
                    }
                }
                // The management loop never came up; tear down here.
                None => self.shared.stop_all_workers(),
            }
        }

        self.shared.join_workers();
        info!("Worker pool shut down complete");
        Ok(())
    }

    /// Whether `shutdown` has been called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Number of live workers.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.shared.registry.lock().workers.len()
    }

    /// Ids of live workers in ascending order.
    #[must_use]
    pub fn worker_ids(&self) -> Vec<WorkerId> {
        self.shared.registry.lock().workers.keys().copied().collect()
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let (worker_count, next_id) = {
            let registry = self.shared.registry.lock();
            (registry.workers.len(), registry.next_id)
        };
        self.shared.counters.snapshot(worker_count, next_id)
    }

    fn job_sender(&self) -> Result<Sender<Job>, PoolError> {
        if self.shared.queue_closed.load(Ordering::Acquire) {
            return Err(PoolError::PoolShutdown);
        }
        self.shared
            .job_tx
            .lock()
            .clone()
            .ok_or(PoolError::PoolShutdown)
    }

    fn record_submitted(&self) {
        self.shared
            .counters
            .submitted_jobs
            .fetch_add(1, Ordering::Relaxed);
        debug!("Job submitted to worker pool");
    }
}

impl<E: JobExecutor> Drop for WorkerPool<E> {
    fn drop(&mut self) {
        // Signal shutdown but don't join: a job still running would hang the drop.
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            let unstarted = self.control_rx.lock().take().is_some();
            if unstarted || self.manager.lock().is_none() {
                self.shared.stop_all_workers();
            } else {
                self.shutdown_tx.lock().take();
            }
            debug!("WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

/// Management loop: applies control requests one at a time until shutdown.
fn manage<E: JobExecutor>(shared: &Shared<E>, control: &ControlReceivers) {
    info!("Starting pool management loop");

    loop {
        select! {
            recv(control.add) -> msg => {
                let Ok(reply) = msg else { break };
                let result = shared.add_worker();
                if let Err(e) = &result {
                    error!(error = %e, "Failed to add worker");
                }
                let _ = reply.send(result);
            }
            recv(control.remove) -> msg => {
                let Ok(reply) = msg else { break };
                let _ = reply.send(shared.pop_worker());
            }
            recv(control.shutdown) -> _ => break,
        }
    }

    shared.stop_all_workers();
    info!("Pool management loop exited");
}
