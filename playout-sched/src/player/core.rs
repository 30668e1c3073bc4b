//! Player construction, shared state and notifications

use super::timer::BlockTimer;
use super::unload::UnloadSchedule;
use crate::error::{Error, Result};
use crate::renderer::RendererRegistry;
use playout_common::events::PlayerState;
use playout_common::{ContentBlock, EventBus, PlayoutEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::info;

/// Default tick resolution of the block-duration timer
pub const DEFAULT_TIMER_RESOLUTION: Duration = Duration::from_millis(100);

/// Static player settings, fixed at construction
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    /// Fallback block played whenever the queue runs dry (indefinite duration)
    pub default_block: ContentBlock,
    /// Tick resolution of the block-duration timer
    pub timer_resolution: Duration,
    /// Buffered events per subscriber before it starts lagging
    pub event_capacity: usize,
}

impl PlayerSettings {
    pub fn new(default_block: ContentBlock) -> Self {
        Self {
            default_block,
            timer_resolution: DEFAULT_TIMER_RESOLUTION,
            event_capacity: 256,
        }
    }

    pub fn with_timer_resolution(mut self, resolution: Duration) -> Self {
        self.timer_resolution = resolution;
        self
    }
}

/// Playout scheduler front end
///
/// Cheap to clone; all clones drive the same queue.
#[derive(Clone)]
pub struct Player {
    pub(super) inner: Arc<PlayerInner>,
}

pub(super) struct PlayerInner {
    /// Media type → renderer, fixed for the process lifetime
    pub(super) renderers: RendererRegistry,

    pub(super) default_block: ContentBlock,

    /// Queued blocks in play order; never contains the current block
    pub(super) queue: RwLock<Vec<ContentBlock>>,

    /// Block on air (None until the first successful transition)
    pub(super) current: RwLock<Option<ContentBlock>>,

    /// Block-duration timer; only touched in synchronous sections
    pub(super) timer: Mutex<BlockTimer>,

    /// Pending unloads of the renderers the last transition took focus from
    pub(super) unloads: Mutex<UnloadSchedule>,

    /// Elapsed time of the current block, updated on every timer tick
    pub(super) progress_ms: Arc<AtomicU64>,

    pub(super) timer_resolution: Duration,

    pub(super) events: EventBus,
}

impl Player {
    /// Create a player over a fixed renderer registry
    ///
    /// Fails when the default block has a finite duration, when no renderer
    /// serves the default block's media type, or when the timer resolution
    /// is zero.
    pub fn new(renderers: RendererRegistry, settings: PlayerSettings) -> Result<Self> {
        let default_media = settings.default_block.media();
        if !default_media.is_indefinite() {
            return Err(Error::Config(format!(
                "Default block '{}' must have an indefinite duration",
                default_media.name()
            )));
        }
        if !renderers.contains(default_media.media_type()) {
            return Err(Error::Config(format!(
                "No renderer registered for the default block's media type {}",
                default_media.media_type()
            )));
        }
        if settings.timer_resolution.is_zero() {
            return Err(Error::Config("Timer resolution must be positive".to_string()));
        }

        info!(
            "Creating player: {} renderer(s), default block '{}', timer resolution {:?}",
            renderers.len(),
            default_media.name(),
            settings.timer_resolution
        );

        Ok(Self {
            inner: Arc::new(PlayerInner {
                renderers,
                default_block: settings.default_block,
                queue: RwLock::new(Vec::new()),
                current: RwLock::new(None),
                timer: Mutex::new(BlockTimer::default()),
                unloads: Mutex::new(UnloadSchedule::default()),
                progress_ms: Arc::new(AtomicU64::new(0)),
                timer_resolution: settings.timer_resolution,
                events: EventBus::new(settings.event_capacity.max(1)),
            }),
        })
    }

    /// Subscribe to queue and current-block notifications
    ///
    /// Dropping the receiver removes the subscription.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayoutEvent> {
        self.inner.events.subscribe()
    }

    /// Immutable snapshot of current block, progress and queue
    pub async fn get_state(&self) -> PlayerState {
        let current_block = self.inner.current.read().await.clone();
        let queue = self.inner.queue.read().await.clone();
        PlayerState {
            current_block,
            progress_ms: self.inner.progress_ms.load(Ordering::Relaxed),
            queue,
        }
    }

    pub async fn current_block(&self) -> Option<ContentBlock> {
        self.inner.current.read().await.clone()
    }

    pub fn default_block(&self) -> &ContentBlock {
        &self.inner.default_block
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.inner.renderers
    }

    pub fn timer_resolution(&self) -> Duration {
        self.inner.timer_resolution
    }

    /// Whether a block-duration timer is currently counting
    pub fn timer_running(&self) -> bool {
        self.inner.lock_timer().is_running()
    }

    pub(super) fn emit_queue_changed(&self, queue: &[ContentBlock]) {
        self.inner.events.emit_lossy(PlayoutEvent::QueueChanged {
            queue: queue.to_vec(),
            timestamp: playout_common::time::now(),
        });
    }

    pub(super) fn emit_current_block_changed(&self, block: &ContentBlock) {
        self.inner.events.emit_lossy(PlayoutEvent::CurrentBlockChanged {
            block: block.clone(),
            timestamp: playout_common::time::now(),
        });
    }
}

impl PlayerInner {
    pub(super) fn lock_timer(&self) -> std::sync::MutexGuard<'_, BlockTimer> {
        self.timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn lock_unloads(&self) -> std::sync::MutexGuard<'_, UnloadSchedule> {
        self.unloads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for PlayerInner {
    fn drop(&mut self) {
        self.lock_timer().cancel();
        self.lock_unloads().cancel_all();
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("renderers", &self.inner.renderers)
            .field("default_block", &self.inner.default_block.id())
            .field("timer_resolution", &self.inner.timer_resolution)
            .finish()
    }
}
