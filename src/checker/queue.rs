// src/checker/queue.rs
// =============================================================================
// A bounded worker pool for async tasks.
//
// push() hands a task to the pool; at most `concurrency` tasks run at once,
// the others wait for a free slot. drain() resolves once every pushed task
// has finished.
//
// How the limit works:
// - every task is spawned right away, but its first step is acquiring a
//   permit from a Semaphore with `concurrency` permits
// - the permit is held until the task finishes, then handed to the next
//   waiter (tokio's Semaphore is fair, so waiters go first-come first-served)
// =============================================================================

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub struct TaskQueue {
    slots: Arc<Semaphore>,
    tasks: JoinSet<()>,
    concurrency: usize,
}

impl TaskQueue {
    /// Creates a pool running at most `concurrency` tasks (at least one)
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            slots: Arc::new(Semaphore::new(concurrency)),
            tasks: JoinSet::new(),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Tasks pushed and not yet finished
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn push<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        self.tasks.spawn(async move {
            // The semaphore is never closed, so acquiring only waits
            let Ok(_permit) = slots.acquire_owned().await else {
                return;
            };
            task.await;
        });
    }

    /// Waits until every pushed task has finished. Returns how many did.
    ///
    /// A task that panics is logged and counted as finished; it does not
    /// stop the others.
    pub async fn drain(mut self) -> usize {
        let mut finished = 0;
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Queued task did not complete");
            }
            finished += 1;
        }
        debug!(finished, "Task queue drained");
        finished
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What is a Semaphore?
//    - A counter of permits; acquire() waits while none are left
//    - The permit is returned when the guard (_permit) is dropped
//    - Dropping also happens on panic, so a crashed task frees its slot
//
// 2. What is a JoinSet?
//    - A set of spawned tasks owned together
//    - join_next() yields each task's result as it finishes, None when empty
//    - Dropping a JoinSet aborts whatever is still running in it
// -----------------------------------------------------------------------------
