//! Delayed feedback with supersede-on-newer semantics.
//!
//! Each scheduled action captures the epoch at schedule time and only runs if
//! nothing newer was scheduled (or [`FeedbackScheduler::supersede`] called)
//! while it slept.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct FeedbackScheduler {
    epoch: Arc<AtomicU64>,
}

impl FeedbackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Cancel every pending action. Returns the new epoch.
    pub fn supersede(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `action` after `delay` unless superseded first. The handle
    /// resolves to whether the action ran.
    pub fn schedule<F>(&self, delay: Duration, action: F) -> JoinHandle<bool>
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = self.supersede();
        let epoch = Arc::clone(&self.epoch);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if epoch.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "feedback superseded");
                return false;
            }
            action();
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn action_runs_when_not_superseded() {
        let scheduler = FeedbackScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        let ran = scheduler
            .schedule(Duration::from_millis(5), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert!(ran);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn newer_action_supersedes_older() {
        let scheduler = FeedbackScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let first_counter = Arc::clone(&hits);
        let first = scheduler.schedule(Duration::from_millis(30), move || {
            first_counter.fetch_add(1, Ordering::SeqCst);
        });
        let second_counter = Arc::clone(&hits);
        let second = scheduler.schedule(Duration::from_millis(5), move || {
            second_counter.fetch_add(10, Ordering::SeqCst);
        });

        assert!(second.await.unwrap());
        assert!(!first.await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn supersede_cancels_pending() {
        let scheduler = FeedbackScheduler::new();
        let pending = scheduler.schedule(Duration::from_millis(20), || {});
        scheduler.supersede();
        assert!(!pending.await.unwrap());
        assert_eq!(scheduler.epoch(), 2);
    }
}
