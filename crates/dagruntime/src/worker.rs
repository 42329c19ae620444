use dagcore::{DagError, NodeError};
use std::future::Future;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinError;

/// Pool of worker threads isolated from the caller's own scheduler.
///
/// Backed by a private tokio runtime whose blocking pool carries the
/// submitted callables. A caller-constructed pool can be reused across
/// submissions and is torn down only when the caller drops it; the
/// helpers below never shut down a pool they did not create.
pub struct WorkerPool {
    runtime: Runtime,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self, DagError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers.max(1))
            .thread_name("dag-worker")
            .enable_all()
            .build()?;
        Ok(Self { runtime })
    }

    fn handle(&self) -> &Handle {
        self.runtime.handle()
    }
}

/// Run a blocking callable on a worker pool and wait for its result.
///
/// With `pool: None` an ephemeral single-worker pool is created for this
/// one call and torn down afterwards. `Err` results come back unchanged;
/// a panic inside the worker surfaces as
/// [`NodeError::ExecutionFailed`] carrying the panic message.
///
/// This is a blocking entry point: call it from synchronous code, not
/// from inside an async task.
pub fn run_in_worker<T, F>(f: F, pool: Option<&WorkerPool>) -> Result<T, DagError>
where
    F: FnOnce() -> Result<T, NodeError> + Send + 'static,
    T: Send + 'static,
{
    match pool {
        Some(pool) => submit(pool.handle(), f),
        None => {
            let ephemeral = WorkerPool::new(1)?;
            submit(ephemeral.handle(), f)
        }
    }
}

/// Run an async callable on a worker pool, driving the future to
/// completion on a scheduler owned by the worker itself.
pub fn run_future_in_worker<T, F, Fut>(f: F, pool: Option<&WorkerPool>) -> Result<T, DagError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, NodeError>>,
    T: Send + 'static,
{
    run_in_worker(
        move || {
            let scheduler = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| NodeError::ExecutionFailed(format!("worker scheduler: {e}")))?;
            scheduler.block_on(f())
        },
        pool,
    )
}

fn submit<T, F>(handle: &Handle, f: F) -> Result<T, DagError>
where
    F: FnOnce() -> Result<T, NodeError> + Send + 'static,
    T: Send + 'static,
{
    let task = handle.spawn_blocking(f);
    match handle.block_on(task) {
        Ok(result) => result.map_err(DagError::from),
        Err(join_err) => Err(DagError::Node(NodeError::ExecutionFailed(panic_message(
            join_err,
        )))),
    }
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "worker task cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}
