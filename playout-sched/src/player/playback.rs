//! Playback transitions
//!
//! **Responsibilities:**
//! - Advance to the next queued block (or the default block)
//! - Immediate overrides that bypass the queue
//! - Startup: default block, then the queue head
//! - Renderer focus protocol (focus target, unload the rest)
//! - Next-block preload
//! - Restart of the current block
//!
//! A transition only commits (current block, timer, CurrentBlockChanged)
//! after the renderer's play call succeeded. Renderer failures are logged
//! and leave the previous block on air; nothing is retried.

use super::core::Player;
use crate::error::Result;
use crate::renderer::Renderer;
use playout_common::{ContentBlock, MediaType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl Player {
    /// Advance to the next block
    ///
    /// Pops the queue head, or falls back to the default block when the queue
    /// is empty. The renderer is resolved before anything is popped: a missing
    /// registration leaves the queue untouched.
    pub async fn progress_queue(&self) -> Result<()> {
        let (next, renderer) = {
            let mut queue = self.inner.queue.write().await;
            let media_type = queue
                .first()
                .map(|b| b.media_type())
                .unwrap_or_else(|| self.inner.default_block.media_type());

            let renderer = match self.inner.renderers.require(media_type) {
                Ok(renderer) => Arc::clone(renderer),
                Err(e) => {
                    warn!("Cannot advance queue: {}", e);
                    return Err(e);
                }
            };

            if queue.is_empty() {
                debug!("Queue empty; falling back to default block");
                (self.inner.default_block.clone(), renderer)
            } else {
                let next = queue.remove(0);
                self.emit_queue_changed(&queue);
                (next, renderer)
            }
        };

        self.transition(next, renderer, None).await
    }

    /// Load and play `block` right away, bypassing the queue
    ///
    /// `unload_delay` postpones unloading the other renderers, e.g. to let a
    /// visual transition finish.
    pub async fn set_current_block_now(
        &self,
        block: ContentBlock,
        unload_delay: Option<Duration>,
    ) -> Result<()> {
        let renderer = match self.inner.renderers.require(block.media_type()) {
            Ok(renderer) => Arc::clone(renderer),
            Err(e) => {
                warn!("Cannot play '{}' now: {}", block.media().name(), e);
                return Err(e);
            }
        };
        self.transition(block, renderer, unload_delay).await
    }

    /// Jump to the configured default block
    pub async fn go_to_default_block(&self, unload_delay: Option<Duration>) -> Result<()> {
        let block = self.inner.default_block.clone();
        self.set_current_block_now(block, unload_delay).await
    }

    /// Put the default block on air, then start the queue if it has blocks
    ///
    /// Used once at startup. Renderer failures are logged and absorbed so
    /// the player keeps running and can still be moved on by the timer, the
    /// auto-pool or a control request.
    pub async fn go_on_air(&self) {
        if let Err(e) = self.go_to_default_block(None).await {
            error!("Failed to start the default block: {}", e);
        }

        if self.queue_len().await == 0 {
            info!("Queue empty; staying on the default block");
            return;
        }
        if let Err(e) = self.progress_queue().await {
            error!("Failed to start the queue: {}", e);
        }
    }

    /// Restart the current block from its beginning
    ///
    /// A no-op when nothing is on air yet.
    pub async fn restart_current_block(&self) -> Result<()> {
        let Some(current) = self.current_block().await else {
            warn!("Restart requested with no current block; ignoring");
            return Ok(());
        };

        let renderer = match self.inner.renderers.require(current.media_type()) {
            Ok(renderer) => Arc::clone(renderer),
            Err(e) => {
                warn!("Cannot restart '{}': {}", current.media().name(), e);
                return Err(e);
            }
        };

        if let Err(e) = renderer.restart_media().await {
            error!("Renderer {} failed to restart '{}': {}", renderer.name(), current.media().name(), e);
            return Err(e.into());
        }

        self.restart_timer(&current);
        info!("Restarted '{}'", current.media().name());
        Ok(())
    }

    async fn transition(
        &self,
        block: ContentBlock,
        renderer: Arc<dyn Renderer>,
        unload_delay: Option<Duration>,
    ) -> Result<()> {
        let media = block.media();
        debug!("Transition to '{}' on renderer {}", media.name(), renderer.name());

        let (_, loaded) = tokio::join!(
            self.focus_renderer(block.media_type(), &renderer, unload_delay),
            renderer.load_media(media)
        );
        if let Err(e) = loaded {
            error!("Renderer {} failed to load '{}': {}", renderer.name(), media.name(), e);
            return Err(e.into());
        }

        if let Err(e) = renderer.play().await {
            error!("Renderer {} failed to play '{}': {}", renderer.name(), media.name(), e);
            return Err(e.into());
        }

        *self.inner.current.write().await = Some(block.clone());
        self.restart_timer(&block);
        self.emit_current_block_changed(&block);
        info!(
            "Now playing '{}' ({})",
            media.name(),
            media
                .duration_ms()
                .map(|ms| format!("{} ms", ms))
                .unwrap_or_else(|| "indefinite".to_string())
        );

        self.preload_next().await;
        Ok(())
    }

    /// Focus the target renderer and schedule unloading of all others
    ///
    /// Replaces whatever the previous transition still had pending, so the
    /// renderer taking focus here is never unloaded by an earlier schedule.
    async fn focus_renderer(
        &self,
        media_type: MediaType,
        renderer: &Arc<dyn Renderer>,
        unload_delay: Option<Duration>,
    ) {
        self.schedule_unloads(media_type, unload_delay);

        if let Err(e) = renderer.focus().await {
            warn!("Renderer {} failed to take focus: {}", renderer.name(), e);
        }
    }

    /// Ask the renderer of the queue head to load it ahead of time
    ///
    /// Skipped when the queue is empty or when the head shares the current
    /// block's media type (that renderer is busy with the current block).
    /// Returns whether a preload was issued.
    pub(super) async fn preload_next(&self) -> bool {
        let Some(head) = self.block_in_queue(0).await else {
            return false;
        };
        let current_type = self.current_block().await.map(|b| b.media_type());
        if current_type == Some(head.media_type()) {
            debug!("Next block '{}' shares the current renderer; no preload", head.media().name());
            return false;
        }

        let Some(renderer) = self.inner.renderers.get(head.media_type()).cloned() else {
            warn!(
                "No renderer for {}; cannot preload '{}'",
                head.media_type(),
                head.media().name()
            );
            return false;
        };

        debug!("Preloading '{}' on renderer {}", head.media().name(), renderer.name());
        self.cancel_unload(&renderer);
        tokio::spawn(async move {
            if let Err(e) = renderer.load_media(head.media()).await {
                error!("Renderer {} failed to preload '{}': {}", renderer.name(), head.media().name(), e);
            }
        });
        true
    }
}
