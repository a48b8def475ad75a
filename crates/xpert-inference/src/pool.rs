//! Bounded worker pool for fanning out model calls.
//!
//! One pool is created per gateway and shared by every batch it runs. Each
//! batch additionally limits itself to `min(workers_per_request × N,
//! max_workers)` concurrent tasks, so a single large batch cannot starve
//! unrelated batches of the whole pool for longer than its share.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error};

/// Fixed-size pool with a submit-and-gather API.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
    workers_per_request: usize,
}

impl WorkerPool {
    /// Create a pool with `max_workers` permits (at least one).
    pub fn new(max_workers: usize, workers_per_request: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            workers_per_request: workers_per_request.max(1),
        }
    }

    /// Upper bound on concurrent tasks across all batches.
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Concurrency used for a batch of `task_count` tasks.
    pub fn batch_width(&self, task_count: usize) -> usize {
        task_count
            .saturating_mul(self.workers_per_request)
            .min(self.max_workers)
            .max(1)
    }

    /// Run every task and wait for all of them.
    ///
    /// Each task is paired with a key that is handed back with its outcome.
    /// A panicking task yields `Err` for its own key and does not disturb
    /// the others, as does a task the runtime cancels. Output order is
    /// completion order.
    pub async fn gather<K, F, T>(&self, tasks: Vec<(K, F)>) -> Vec<(K, Result<T, String>)>
    where
        K: Send + 'static,
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if tasks.is_empty() {
            return Vec::new();
        }

        let task_count = tasks.len();
        let width = self.batch_width(task_count);
        debug!(task_count, width, "Submitting batch to worker pool");

        let batch = Arc::new(Semaphore::new(width));
        let mut set = JoinSet::new();
        let mut keys = HashMap::with_capacity(task_count);

        for (key, task) in tasks {
            let batch = batch.clone();
            let shared = self.permits.clone();
            let handle = set.spawn(async move {
                // Neither semaphore is ever closed, so acquisition only waits.
                let _batch_permit = batch.acquire_owned().await;
                let _pool_permit = shared.acquire_owned().await;
                AssertUnwindSafe(task)
                    .catch_unwind()
                    .await
                    .map_err(|_| "worker task panicked".to_string())
            });
            keys.insert(handle.id(), key);
        }

        let mut results = Vec::with_capacity(task_count);
        while let Some(joined) = set.join_next_with_id().await {
            results.extend(settle(&mut keys, joined));
        }
        results
    }
}

type Joined<T> = Result<(Id, Result<T, String>), JoinError>;

/// Pair a joined task with its key. A cancelled task still yields `Err`.
fn settle<K, T>(keys: &mut HashMap<Id, K>, joined: Joined<T>) -> Option<(K, Result<T, String>)> {
    let (id, outcome) = match joined {
        Ok((id, outcome)) => (id, outcome),
        Err(e) => {
            error!(error = ?e, "Worker task was cancelled");
            (e.id(), Err(format!("worker task cancelled: {}", e)))
        }
    };
    keys.remove(&id).map(|key| (key, outcome))
}
