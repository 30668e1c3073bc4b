//! Queue replenishment
//!
//! A refill is evaluated on every QueueChanged / CurrentBlockChanged from the
//! player and when the auto-pool is switched on. When the queue is short of
//! the target, one batch of polls is issued, one per missing slot. Further
//! evaluations are no-ops until every slot of that batch has settled.

use super::{ContentSourceManager, ManagerInner};
use crate::source::ContentSource;
use playout_common::{PlayoutEvent, PullOrder};
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

/// Outcome of one refill evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillDecision {
    /// Auto-pool switched off
    Disabled,
    /// A batch is still outstanding
    InProgress,
    /// Queue already at or above the target
    QueueFull,
    /// No source is currently in the pool
    EmptyPool,
    /// A batch of `pulls` polls was issued
    Started { pulls: usize },
}

/// Bookkeeping of the outstanding (or last) refill batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefillProgress {
    pub in_progress: bool,
    pub expected_pulls: usize,
    pub completed_pulls: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl ContentSourceManager {
    pub fn refill_progress(&self) -> RefillProgress {
        self.lock_state().refill
    }

    /// Decide whether the queue needs topping up and, if so, issue a batch
    ///
    /// The in-progress flag is checked and set under the same lock, before
    /// any poll is issued, so concurrent evaluations cannot both start a
    /// batch.
    pub async fn evaluate_refill(&self) -> RefillDecision {
        {
            let state = self.lock_state();
            if !state.options.enabled {
                return RefillDecision::Disabled;
            }
            if state.refill.in_progress {
                debug!("Refill already in progress");
                return RefillDecision::InProgress;
            }
        }

        let queue_len = self.inner.player.get_state().await.queue_len();

        let batch = {
            let mut state = self.lock_state();
            // Re-check: options or another evaluation may have moved on
            if !state.options.enabled {
                return RefillDecision::Disabled;
            }
            if state.refill.in_progress {
                return RefillDecision::InProgress;
            }

            let target = state.options.target_queue_size as usize;
            if queue_len >= target {
                return RefillDecision::QueueFull;
            }

            let pool: Vec<Arc<dyn ContentSource>> = state
                .sources
                .iter()
                .filter(|s| s.in_pool)
                .map(|s| Arc::clone(&s.source))
                .collect();
            if pool.is_empty() {
                warn!("Auto-pool is empty; cannot refill queue ({}/{})", queue_len, target);
                return RefillDecision::EmptyPool;
            }

            let pulls = target - queue_len;
            state.refill = RefillProgress {
                in_progress: true,
                expected_pulls: pulls,
                ..RefillProgress::default()
            };
            select_sources(state.options.pull_order, &pool, pulls, &mut rand::thread_rng())
        };

        let pulls = batch.len();
        info!("Refilling queue: {} pull(s) (queue {})", pulls, queue_len);
        self.inner.events.emit_lossy(PlayoutEvent::RefillStarted {
            pulls,
            timestamp: playout_common::time::now(),
        });

        for (slot, source) in batch.into_iter().enumerate() {
            let manager = self.clone();
            tokio::spawn(async move {
                let ok = match source.poll().await {
                    Ok(block) => {
                        debug!("Slot {}: '{}' from {}", slot, block.media().name(), source.name());
                        manager.inner.player.enqueue_block(block).await;
                        true
                    }
                    Err(e) => {
                        error!("Slot {}: poll of source '{}' failed: {}", slot, source.name(), e);
                        false
                    }
                };
                manager.complete_pull(ok);
            });
        }

        RefillDecision::Started { pulls }
    }

    /// Settle one slot; the last one clears the in-progress flag
    fn complete_pull(&self, succeeded: bool) {
        let finished = {
            let mut state = self.lock_state();
            let refill = &mut state.refill;
            refill.completed_pulls += 1;
            if succeeded {
                refill.succeeded += 1;
            } else {
                refill.failed += 1;
            }
            if refill.in_progress && refill.completed_pulls >= refill.expected_pulls {
                refill.in_progress = false;
                Some(*refill)
            } else {
                None
            }
        };

        if let Some(progress) = finished {
            info!(
                "Refill complete: {} succeeded, {} failed",
                progress.succeeded, progress.failed
            );
            self.inner.events.emit_lossy(PlayoutEvent::RefillCompleted {
                succeeded: progress.succeeded,
                failed: progress.failed,
                timestamp: playout_common::time::now(),
            });
        }
    }

    /// Start reacting to player notifications
    ///
    /// The subscription is taken before this returns, so no event emitted
    /// afterwards is missed. Calling it again replaces the listener.
    pub fn start(&self) {
        let mut rx = self.inner.player.subscribe();
        let weak: Weak<ManagerInner> = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            loop {
                let trigger = match rx.recv().await {
                    Ok(event @ PlayoutEvent::QueueChanged { .. })
                    | Ok(event @ PlayoutEvent::CurrentBlockChanged { .. }) => event.event_type(),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Auto-pool listener lagged by {} event(s); re-evaluating", skipped);
                        "Lagged"
                    }
                    Err(RecvError::Closed) => break,
                };

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                debug!("Refill evaluation triggered by {}", trigger);
                ContentSourceManager { inner }.evaluate_refill().await;
            }
            debug!("Auto-pool listener stopped");
        });

        if let Some(previous) = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(handle)
        {
            previous.abort();
        }
    }

    /// Stop reacting to player notifications
    pub fn stop(&self) {
        if let Some(handle) = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

/// Pick the source for each of `count` slots
///
/// Random picks uniformly with replacement; OneEach walks the pool in
/// registration order, wrapping around when there are more slots than
/// sources.
pub(super) fn select_sources<R: Rng>(
    order: PullOrder,
    pool: &[Arc<dyn ContentSource>],
    count: usize,
    rng: &mut R,
) -> Vec<Arc<dyn ContentSource>> {
    if pool.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|slot| {
            let index = match order {
                PullOrder::Random => rng.gen_range(0..pool.len()),
                PullOrder::OneEach => slot % pool.len(),
            };
            Arc::clone(&pool[index])
        })
        .collect()
}
