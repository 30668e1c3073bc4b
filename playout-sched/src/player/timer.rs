//! Block-duration timer
//!
//! One timer per current block. It ticks at the player's fixed resolution,
//! accumulating elapsed time into the shared progress counter; once the
//! accumulated time reaches the block's duration it stops and advances the
//! queue. Blocks with indefinite duration get no timer.
//!
//! Every (re)start bumps a generation counter and aborts the previous task,
//! so at most one timer is live and a stale timer can never advance the
//! queue.

use super::core::{Player, PlayerInner};
use playout_common::time::duration_to_millis;
use playout_common::ContentBlock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Default)]
pub(super) struct BlockTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl BlockTimer {
    pub(super) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Abort the running timer, if any; returns the new generation
    pub(super) fn cancel(&mut self) -> u64 {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

impl Player {
    /// Cancel any running timer and start one for `block`
    ///
    /// Resets progress to zero. No timer is started for indefinite media.
    pub(super) fn restart_timer(&self, block: &ContentBlock) {
        let mut timer = self.inner.lock_timer();
        let generation = timer.cancel();
        self.inner.progress_ms.store(0, Ordering::Relaxed);

        let Some(duration) = block.media().duration() else {
            debug!("'{}' has indefinite duration; no timer", block.media().name());
            return;
        };

        debug!(
            "Starting timer for '{}' ({} ms, generation {})",
            block.media().name(),
            duration.as_millis(),
            generation
        );
        timer.handle = Some(tokio::spawn(run_timer(
            Arc::downgrade(&self.inner),
            generation,
            duration,
            self.inner.timer_resolution,
            Arc::clone(&self.inner.progress_ms),
        )));
    }
}

async fn run_timer(
    player: Weak<PlayerInner>,
    generation: u64,
    duration: Duration,
    resolution: Duration,
    progress_ms: Arc<AtomicU64>,
) {
    let mut ticker = interval_at(Instant::now() + resolution, resolution);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    let mut elapsed = Duration::ZERO;
    while elapsed < duration {
        ticker.tick().await;
        elapsed += resolution;
        progress_ms.store(duration_to_millis(elapsed), Ordering::Relaxed);
    }

    let Some(inner) = player.upgrade() else {
        return;
    };

    // Detach from the timer slot before advancing so the transition below
    // cannot abort this task when it restarts the timer.
    {
        let mut timer = inner.lock_timer();
        if timer.generation != generation {
            return;
        }
        timer.handle = None;
    }

    debug!("Block duration elapsed after {} ms; advancing", elapsed.as_millis());
    let player = Player { inner };
    // Failures are logged inside the transition
    let _ = player.progress_queue().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_bumps_generation() {
        let mut timer = BlockTimer::default();
        assert!(!timer.is_running());
        assert_eq!(timer.cancel(), 1);
        assert_eq!(timer.cancel(), 2);
    }
}
