//! Bounded worker pool for I/O-bound unit reads
//!
//! Each item runs as a blocking task on a private tokio runtime. A semaphore
//! caps how many run at once, and every task writes into its own result slot,
//! so output order always matches input order. Tasks never touch session
//! state; callers merge the returned values on their own thread.

use crate::error::DiscoveryError;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Worker pool with a fixed upper bound on concurrency.
#[derive(Debug, Clone, Copy)]
pub struct BoundedPool {
    workers: usize,
}

impl BoundedPool {
    /// Create a pool; a bound of zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Apply `f` to every item with at most `workers` calls in flight.
    ///
    /// Results are returned in input order. With a single worker (or a single
    /// item) everything runs on the calling thread. Must not be called from
    /// inside an async runtime.
    pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>, DiscoveryError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let workers = self.workers.min(items.len());
        if workers <= 1 {
            return Ok(items.into_iter().map(f).collect());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(workers)
            .build()
            .map_err(|e| DiscoveryError::WorkerPool(e.to_string()))?;
        debug!(workers, items = items.len(), "Dispatching blocking tasks");
        runtime.block_on(run_bounded(workers, items, Arc::new(f)))
    }
}

async fn run_bounded<T, R, F>(
    workers: usize,
    items: Vec<T>,
    f: Arc<F>,
) -> Result<Vec<R>, DiscoveryError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(workers));
    let slots: Arc<Mutex<Vec<Option<R>>>> =
        Arc::new(Mutex::new(items.iter().map(|_| None).collect()));
    let mut tasks = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| DiscoveryError::WorkerPool(e.to_string()))?;
        let f = Arc::clone(&f);
        let slots = Arc::clone(&slots);
        tasks.spawn_blocking(move || {
            let result = f(item);
            slots.lock()[index] = Some(result);
            drop(permit);
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
            return Err(DiscoveryError::WorkerPool(e.to_string()));
        }
    }

    let slots = std::mem::take(&mut *slots.lock());
    Ok(slots.into_iter().flatten().collect())
}

impl Default for BoundedPool {
    fn default() -> Self {
        Self::new(1)
    }
}
