//! Cancellable, keyed one-shot timers.
//!
//! Rooms need a handful of delayed actions (the round countdown, the
//! short pause before the next round or game, the disconnect grace
//! period), and every one of them must be *replaceable* and *cancellable*:
//! a round that ends early because everyone moved must be able to kill
//! the pending timeout, not merely outrun it.
//!
//! [`TimerArena`] is a map from a key (room code, player id) to one
//! pending delayed future. Scheduling a key replaces whatever was pending
//! under it; cancelling aborts it. Fired futures should still re-check
//! state before acting; the arena makes stale firings rare and the re-check
//! makes them harmless.
//!
//! # Integration
//!
//! ```ignore
//! timers.schedule(room.clone(), round_time, async move {
//!     server.end_round(&room).await;   // re-checks phase internally
//! });
//! ...
//! timers.cancel(&room);               // everyone moved early
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// A map of pending one-shot timers, at most one per key.
pub struct TimerArena<K> {
    tasks: HashMap<K, JoinHandle<()>>,
}

impl<K> TimerArena<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Schedules `action` to run after `delay`, replacing (and aborting)
    /// any timer already pending under `key`.
    pub fn schedule<F>(&mut self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.prune();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        trace!(?key, ?delay, "timer scheduled");
        if let Some(previous) = self.tasks.insert(key, handle) {
            previous.abort();
        }
    }

    /// Aborts the timer pending under `key`. Returns whether one was
    /// actually pending (a fired or never-scheduled key answers `false`).
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.tasks.remove(key) {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                if pending {
                    trace!(?key, "timer cancelled");
                }
                pending
            }
            None => false,
        }
    }

    /// Whether a timer is pending (scheduled and not yet fired) for `key`.
    pub fn is_pending(&self, key: &K) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Aborts everything. Used at shutdown.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn prune(&mut self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}

impl<K> Default for TimerArena<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for TimerArena<K> {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Uses `tokio::time::pause()` (via `start_paused`) so timers resolve
    //! deterministically without real sleeping.

    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    fn channel() -> (mpsc::UnboundedSender<u32>, mpsc::UnboundedReceiver<u32>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_delay() {
        let mut arena: TimerArena<&'static str> = TimerArena::new();
        let (tx, mut rx) = channel();

        arena.schedule("round", Duration::from_secs(5), async move {
            let _ = tx.send(1);
        });
        assert!(arena.is_pending(&"round"));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(rx.recv().await, Some(1));
        assert!(!arena.is_pending(&"round"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let mut arena: TimerArena<&'static str> = TimerArena::new();
        let (tx, mut rx) = channel();

        arena.schedule("round", Duration::from_secs(5), async move {
            let _ = tx.send(1);
        });
        assert!(arena.cancel(&"round"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err(), "cancelled timer fired anyway");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending_timer() {
        let mut arena: TimerArena<&'static str> = TimerArena::new();
        let (tx, mut rx) = channel();

        let tx1 = tx.clone();
        arena.schedule("round", Duration::from_secs(5), async move {
            let _ = tx1.send(1);
        });
        // Replace before the first fires; only the second may run.
        arena.schedule("round", Duration::from_secs(2), async move {
            let _ = tx.send(2);
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err(), "replaced timer fired too");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_unknown_or_fired_key_reports_false() {
        let mut arena: TimerArena<&'static str> = TimerArena::new();
        assert!(!arena.cancel(&"nope"));

        let (tx, mut rx) = channel();
        arena.schedule("round", Duration::from_secs(1), async move {
            let _ = tx.send(1);
        });
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.recv().await, Some(1));
        assert!(!arena.cancel(&"round"), "already fired");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let mut arena: TimerArena<u8> = TimerArena::new();
        let (tx, mut rx) = channel();

        let tx1 = tx.clone();
        arena.schedule(1, Duration::from_secs(3), async move {
            let _ = tx1.send(1);
        });
        arena.schedule(2, Duration::from_secs(3), async move {
            let _ = tx.send(2);
        });
        arena.cancel(&1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_clears_everything() {
        let mut arena: TimerArena<u8> = TimerArena::new();
        let (tx, mut rx) = channel();

        for key in 0..4u8 {
            let tx = tx.clone();
            arena.schedule(key, Duration::from_secs(1), async move {
                let _ = tx.send(key as u32);
            });
        }
        assert_eq!(arena.pending(), 4);
        arena.cancel_all();
        assert_eq!(arena.pending(), 0);

        drop(tx);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.recv().await.is_none(), "a cancelled timer fired");
    }
}
