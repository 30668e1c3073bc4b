//! Scheduled unloading of unfocused renderers
//!
//! Each transition replaces the whole schedule: pending unloads of the
//! previous transition are aborted and the generation is bumped, so a
//! delayed unload can never hit a renderer that a later transition focused.
//! A preload claims its renderer by cancelling that renderer's pending
//! unload, which keeps the preloaded media in place.

use super::core::{Player, PlayerInner};
use crate::renderer::Renderer;
use playout_common::MediaType;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

struct PendingUnload {
    renderer: Arc<dyn Renderer>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub(super) struct UnloadSchedule {
    pending: Vec<PendingUnload>,
    generation: u64,
}

impl UnloadSchedule {
    /// Abort every pending unload; returns the new generation
    pub(super) fn cancel_all(&mut self) -> u64 {
        for unload in self.pending.drain(..) {
            unload.handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Abort the pending unload of `renderer`, if any
    fn cancel_for(&mut self, renderer: &Arc<dyn Renderer>) -> bool {
        let before = self.pending.len();
        self.pending.retain(|unload| {
            if Arc::ptr_eq(&unload.renderer, renderer) {
                unload.handle.abort();
                false
            } else {
                true
            }
        });
        self.pending.len() != before
    }

    /// Take the entry of `renderer` if it still belongs to `generation`
    fn claim(&mut self, generation: u64, renderer: &Arc<dyn Renderer>) -> bool {
        if self.generation != generation {
            return false;
        }
        // The caller is the entry's own task, so it is removed, not aborted
        match self
            .pending
            .iter()
            .position(|unload| Arc::ptr_eq(&unload.renderer, renderer))
        {
            Some(index) => {
                self.pending.swap_remove(index);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for UnloadSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnloadSchedule")
            .field("pending", &self.pending.len())
            .field("generation", &self.generation)
            .finish()
    }
}

impl Player {
    /// Replace the unload schedule with one for every renderer but `focused`
    pub(super) fn schedule_unloads(&self, focused: MediaType, delay: Option<Duration>) {
        let mut schedule = self.inner.lock_unloads();
        let generation = schedule.cancel_all();

        for (media_type, renderer) in self.inner.renderers.others(focused) {
            let handle = tokio::spawn(run_unload(
                Arc::downgrade(&self.inner),
                generation,
                media_type,
                Arc::clone(&renderer),
                delay,
            ));
            schedule.pending.push(PendingUnload { renderer, handle });
        }
    }

    /// Keep `renderer` loaded: drop its pending unload
    pub(super) fn cancel_unload(&self, renderer: &Arc<dyn Renderer>) {
        if self.inner.lock_unloads().cancel_for(renderer) {
            debug!("Cancelled pending unload of renderer {}", renderer.name());
        }
    }
}

async fn run_unload(
    player: Weak<PlayerInner>,
    generation: u64,
    media_type: MediaType,
    renderer: Arc<dyn Renderer>,
    delay: Option<Duration>,
) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let Some(inner) = player.upgrade() else {
        return;
    };
    if !inner.lock_unloads().claim(generation, &renderer) {
        debug!("Unload of renderer {} superseded", renderer.name());
        return;
    }
    drop(inner);

    if let Err(e) = renderer.unload_media().await {
        error!("Renderer {} ({}) failed to unload: {}", renderer.name(), media_type, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_all_bumps_generation() {
        let mut schedule = UnloadSchedule::default();
        assert_eq!(schedule.cancel_all(), 1);
        assert_eq!(schedule.cancel_all(), 2);
    }

    #[test]
    fn test_stale_generation_cannot_claim() {
        let mut schedule = UnloadSchedule::default();
        let generation = schedule.cancel_all();
        schedule.cancel_all();
        let renderer: Arc<dyn Renderer> = Arc::new(crate::renderer::LoggingRenderer::new("image"));
        assert!(!schedule.claim(generation, &renderer));
    }
}
