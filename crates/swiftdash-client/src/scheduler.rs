//! Delayed tasks tagged with a state epoch.
//!
//! Every task records the epoch it was scheduled under. When the owning store
//! moves to a new epoch it calls [`Scheduler::cancel_before`], which aborts
//! anything older. A task that already woke before the abort must still
//! compare epochs under the store's lock; aborting only saves the wakeup.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

struct Scheduled {
    epoch: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct Scheduler {
    tasks: Mutex<Vec<Scheduled>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`. Must be called from inside a tokio runtime.
    pub fn schedule<F>(&self, epoch: u64, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|t| !t.handle.is_finished());
        tasks.push(Scheduled { epoch, handle });
    }

    /// Abort every pending task scheduled under an epoch older than `epoch`.
    /// Returns how many were aborted.
    pub fn cancel_before(&self, epoch: u64) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let mut aborted = 0;
        tasks.retain(|t| {
            if t.handle.is_finished() {
                return false;
            }
            if t.epoch < epoch {
                t.handle.abort();
                aborted += 1;
                return false;
            }
            true
        });
        if aborted > 0 {
            tracing::debug!(aborted, epoch, "cancelled stale scheduled tasks");
        }
        aborted
    }

    /// Number of tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.iter().filter(|t| !t.handle.is_finished()).count()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for t in tasks.drain(..) {
            t.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_task_runs_after_delay() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        scheduler.schedule(0, Duration::from_secs(3), async move {
            h.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_only_hits_older_epochs() {
        let scheduler = Scheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for epoch in [1, 2, 3] {
            let h = hits.clone();
            scheduler.schedule(epoch, Duration::from_secs(1), async move {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert_eq!(scheduler.cancel_before(3), 2);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
