//! Auto-revert timer for the timed success/failed states.
//!
//! At most one revert is pending. It carries the generation it was scheduled
//! for; the scheduler acts on it only if nothing else has happened since.

use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRevert {
    pub generation: u64,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
pub struct RevertTimer {
    pending: Option<PendingRevert>,
}

impl RevertTimer {
    /// Replace any pending revert with one for `generation` at `deadline`.
    pub fn schedule(&mut self, generation: u64, deadline: Instant) {
        self.pending = Some(PendingRevert {
            generation,
            deadline,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<PendingRevert> {
        self.pending
    }

    /// Take the pending revert once it has fired.
    pub fn take(&mut self) -> Option<PendingRevert> {
        self.pending.take()
    }

    /// Resolve with the generation of `pending` at its deadline, or never.
    ///
    /// Takes a copy so the caller can keep `&mut` access to the timer while
    /// this future is being raced in a `select!`.
    pub async fn wait(pending: Option<PendingRevert>) -> u64 {
        match pending {
            Some(revert) => {
                sleep_until(revert.deadline).await;
                revert.generation
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_wait_fires_at_deadline() {
        let mut timer = RevertTimer::default();
        let start = Instant::now();
        timer.schedule(7, start + Duration::from_secs(3));

        let generation = RevertTimer::wait(timer.pending()).await;
        assert_eq!(generation, 7);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let mut timer = RevertTimer::default();
        timer.schedule(1, Instant::now() + Duration::from_millis(10));
        timer.cancel();
        assert!(timer.pending().is_none());

        let fired = tokio::time::timeout(Duration::from_secs(60), RevertTimer::wait(timer.pending())).await;
        assert!(fired.is_err());
    }

    #[tokio::test]
    async fn test_schedule_replaces_previous() {
        let mut timer = RevertTimer::default();
        let now = Instant::now();
        timer.schedule(1, now);
        timer.schedule(2, now + Duration::from_secs(1));
        assert_eq!(timer.take().map(|p| p.generation), Some(2));
        assert!(timer.pending().is_none());
    }
}
