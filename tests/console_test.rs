//! Integration tests for the interactive console.

use async_trait::async_trait;
use elastic_pool::config::WorkerPoolConfig;
use elastic_pool::core::{Job, JobContext, JobExecutor, PoolError, WorkerId, WorkerPool};
use elastic_pool::runtime::{dispatch, run_console, Command, Flow, PROMPT};
use parking_lot::Mutex;
use std::io::{self, Cursor, Write};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct RecordingExecutor {
    seen: Arc<Mutex<Vec<(WorkerId, Job)>>>,
}

#[async_trait]
impl JobExecutor for RecordingExecutor {
    async fn execute(&self, job: Job, ctx: JobContext) {
        self.seen.lock().push((ctx.worker_id, job));
    }
}

fn started_pool(initial: i64, executor: RecordingExecutor) -> WorkerPool<RecordingExecutor> {
    let pool = WorkerPool::new(
        WorkerPoolConfig::new()
            .with_initial_workers(initial)
            .with_thread_stack_size(256 * 1024),
        executor,
    )
    .expect("Failed to create pool");
    pool.start().expect("Failed to start pool");
    pool
}

#[test]
fn test_console_session() {
    let executor = RecordingExecutor::default();
    let pool = started_pool(2, executor.clone());

    let input = Cursor::new("add\nremove\nremove\n\n  hello world  \nexit\nnever read\n");
    let mut output = Vec::new();
    run_console(&pool, input, &mut output).unwrap();

    assert!(pool.is_shutdown());
    assert_eq!(pool.worker_count(), 0);

    let seen = executor.seen.lock().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (1, "hello world".to_string()));

    let printed = String::from_utf8(output).unwrap();
    assert_eq!(printed.matches(PROMPT).count(), 6);
}

#[test]
fn test_console_shuts_down_at_end_of_input() {
    let pool = started_pool(1, RecordingExecutor::default());

    run_console(&pool, Cursor::new("add\n"), Vec::new()).unwrap();

    assert!(pool.is_shutdown());
    assert_eq!(pool.worker_count(), 0);
}

#[test]
fn test_console_shuts_down_on_unreadable_line() {
    let executor = RecordingExecutor::default();
    let pool = started_pool(2, executor.clone());

    let input = Cursor::new(b"add\n\xff\xfe\nlate job\nexit\n".to_vec());
    run_console(&pool, input, Vec::new()).unwrap();

    assert!(pool.is_shutdown());
    assert_eq!(pool.worker_count(), 0);
    assert!(executor.seen.lock().is_empty());
}

/// Writer whose every write fails.
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_console_shuts_down_when_prompt_cannot_be_written() {
    let pool = started_pool(1, RecordingExecutor::default());

    let result = run_console(&pool, Cursor::new("add\n"), BrokenPipe);

    assert!(result.is_err());
    assert!(pool.is_shutdown());
    assert_eq!(pool.worker_count(), 0);
}

#[test]
fn test_console_keeps_going_after_command_error() {
    let pool = started_pool(1, RecordingExecutor::default());
    pool.shutdown().unwrap();

    // Every command fails with PoolShutdown; the console still reaches `exit`.
    let input = Cursor::new("add\nremove\njob\nexit\n");
    run_console(&pool, input, Vec::new()).unwrap();
}

#[test]
fn test_dispatch_maps_commands_to_pool_calls() {
    let executor = RecordingExecutor::default();
    let pool = started_pool(1, executor.clone());

    assert_eq!(dispatch(&pool, Command::Empty), Ok(Flow::Continue));
    assert_eq!(dispatch(&pool, Command::AddWorker), Ok(Flow::Continue));
    assert_eq!(pool.worker_ids(), vec![1, 2]);
    assert_eq!(dispatch(&pool, Command::RemoveWorker), Ok(Flow::Continue));
    assert_eq!(pool.worker_ids(), vec![1]);

    assert_eq!(dispatch(&pool, Command::Submit("work".into())), Ok(Flow::Continue));
    let deadline = Instant::now() + Duration::from_secs(5);
    while executor.seen.lock().is_empty() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(executor.seen.lock().len(), 1);

    assert_eq!(dispatch(&pool, Command::Exit), Ok(Flow::Exit));
    assert_eq!(dispatch(&pool, Command::Exit), Ok(Flow::Exit));
    assert_eq!(
        dispatch(&pool, Command::AddWorker),
        Err(PoolError::PoolShutdown)
    );
}
