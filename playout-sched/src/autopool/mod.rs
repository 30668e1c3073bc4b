//! Content source manager and auto-pool
//!
//! **Responsibilities:**
//! - Registry of content sources (add, update, remove, refresh)
//! - Auto-pool membership per source (joins the pool on registration)
//! - Auto-pool options (enabled, target queue size, pull order)
//! - Queue replenishment with at most one refill batch in flight (`refill`)
//! - Emit PoolListChanged / PoolOptionsChanged / SourceListChanged
//!
//! All manager state sits behind one synchronous lock that is never held
//! across an await; the refill in-progress flag is set under that lock before
//! any poll is issued.

mod refill;

pub use refill::{RefillDecision, RefillProgress};

use crate::error::{Error, Result};
use crate::player::Player;
use crate::source::{self, ContentSource};
use playout_common::events::PoolMember;
use playout_common::{AutoPoolOptions, EventBus, PlayoutEvent, PullOrder, SourceId, SourceInfo};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct RegisteredSource {
    source: Arc<dyn ContentSource>,
    in_pool: bool,
}

struct PoolState {
    options: AutoPoolOptions,
    /// Registration order; OneEach pulls follow this order
    sources: Vec<RegisteredSource>,
    refill: RefillProgress,
}

pub(crate) struct ManagerInner {
    player: Player,
    state: Mutex<PoolState>,
    events: EventBus,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Owner of the content sources and the queue replenishment policy
///
/// Cheap to clone; all clones share the same registry and pool.
#[derive(Clone)]
pub struct ContentSourceManager {
    inner: Arc<ManagerInner>,
}

impl ContentSourceManager {
    pub fn new(player: Player, options: AutoPoolOptions, event_capacity: usize) -> Self {
        info!(
            "Creating content source manager: auto-pool {}, target {}, order {}",
            if options.enabled { "enabled" } else { "disabled" },
            options.target_queue_size,
            options.pull_order
        );
        Self {
            inner: Arc::new(ManagerInner {
                player,
                state: Mutex::new(PoolState {
                    options,
                    sources: Vec::new(),
                    refill: RefillProgress::default(),
                }),
                events: EventBus::new(event_capacity.max(1)),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to pool, options and source-list notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlayoutEvent> {
        self.inner.events.subscribe()
    }

    pub fn player(&self) -> &Player {
        &self.inner.player
    }

    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.inner.lock_state()
    }

    // ------------------------------------------------------------------
    // Source registry
    // ------------------------------------------------------------------

    /// Register a source; it joins the auto-pool immediately
    pub fn add_source(&self, source: Arc<dyn ContentSource>) -> Result<SourceId> {
        let id = source.id();
        {
            let mut state = self.lock_state();
            if state.sources.iter().any(|s| s.source.id() == id) {
                return Err(Error::InvalidState(format!("Source {} already registered", id)));
            }
            info!("Registered source '{}' ({}, {})", source.name(), source.kind(), id);
            state.sources.push(RegisteredSource {
                source,
                in_pool: true,
            });
        }
        self.emit_source_list_changed();
        self.emit_pool_list_changed();
        Ok(id)
    }

    /// Swap in a new implementation for the source with the same id
    ///
    /// Pool membership is preserved.
    pub fn update_source(&self, source: Arc<dyn ContentSource>) -> Result<()> {
        let id = source.id();
        {
            let mut state = self.lock_state();
            let entry = state
                .sources
                .iter_mut()
                .find(|s| s.source.id() == id)
                .ok_or(Error::SourceNotFound(id))?;
            info!("Updated source '{}' ({})", source.name(), id);
            entry.source = source;
        }
        self.emit_source_list_changed();
        Ok(())
    }

    /// Unregister a source
    pub fn remove_source(&self, id: SourceId) -> Result<Arc<dyn ContentSource>> {
        let removed = {
            let mut state = self.lock_state();
            let index = state
                .sources
                .iter()
                .position(|s| s.source.id() == id)
                .ok_or(Error::SourceNotFound(id))?;
            state.sources.remove(index)
        };
        info!("Removed source '{}' ({})", removed.source.name(), id);
        self.emit_source_list_changed();
        if removed.in_pool {
            self.emit_pool_list_changed();
        }
        Ok(removed.source)
    }

    /// Include or exclude a registered source from the auto-pool
    pub fn set_source_in_pool(&self, id: SourceId, in_pool: bool) -> Result<()> {
        let changed = {
            let mut state = self.lock_state();
            let entry = state
                .sources
                .iter_mut()
                .find(|s| s.source.id() == id)
                .ok_or(Error::SourceNotFound(id))?;
            let changed = entry.in_pool != in_pool;
            entry.in_pool = in_pool;
            changed
        };
        if changed {
            info!("Source {} {} the auto-pool", id, if in_pool { "joined" } else { "left" });
            self.emit_pool_list_changed();
        }
        Ok(())
    }

    pub fn get_source(&self, id: SourceId) -> Option<Arc<dyn ContentSource>> {
        self.lock_state()
            .sources
            .iter()
            .find(|s| s.source.id() == id)
            .map(|s| Arc::clone(&s.source))
    }

    /// Read model of every registered source, in registration order
    pub fn list_sources(&self) -> Vec<SourceInfo> {
        self.lock_state()
            .sources
            .iter()
            .map(|s| source::describe(s.source.as_ref(), s.in_pool))
            .collect()
    }

    /// Pool membership of every registered source
    pub fn pool_members(&self) -> Vec<PoolMember> {
        self.inner.pool_members()
    }

    /// Ask a source to re-scan its candidates
    pub async fn refresh_source(&self, id: SourceId) -> Result<()> {
        let source = self.get_source(id).ok_or(Error::SourceNotFound(id))?;
        if let Err(e) = source.refresh().await {
            warn!("Refresh of source '{}' failed: {}", source.name(), e);
            return Err(e.into());
        }
        info!("Refreshed source '{}'", source.name());
        self.emit_source_list_changed();
        Ok(())
    }

    /// Refresh every registered source concurrently; returns the failure count
    pub async fn refresh_all(&self) -> usize {
        let sources: Vec<_> = self
            .lock_state()
            .sources
            .iter()
            .map(|s| Arc::clone(&s.source))
            .collect();

        let results = futures::future::join_all(sources.iter().map(|s| s.refresh())).await;
        let mut failures = 0;
        for (source, result) in sources.iter().zip(results) {
            if let Err(e) = result {
                warn!("Refresh of source '{}' failed: {}", source.name(), e);
                failures += 1;
            }
        }
        self.emit_source_list_changed();
        failures
    }

    // ------------------------------------------------------------------
    // Auto-pool options
    // ------------------------------------------------------------------

    pub fn options(&self) -> AutoPoolOptions {
        self.lock_state().options
    }

    /// Replace all options; re-evaluates when this turns the pool on
    pub async fn set_auto_pool_options(&self, options: AutoPoolOptions) -> Option<RefillDecision> {
        let turned_on = {
            let mut state = self.lock_state();
            let turned_on = !state.options.enabled && options.enabled;
            state.options = options;
            turned_on
        };
        self.emit_pool_options_changed(options);
        if turned_on {
            Some(self.evaluate_refill().await)
        } else {
            None
        }
    }

    /// Enable or disable the auto-pool
    ///
    /// Going from disabled to enabled evaluates a refill right away.
    pub async fn set_auto_pool_enabled(&self, enabled: bool) -> Option<RefillDecision> {
        let options = AutoPoolOptions {
            enabled,
            ..self.options()
        };
        self.set_auto_pool_options(options).await
    }

    /// Takes effect on the next trigger
    pub fn set_target_queue_size(&self, target_queue_size: u32) {
        let options = {
            let mut state = self.lock_state();
            state.options.target_queue_size = target_queue_size;
            state.options
        };
        self.emit_pool_options_changed(options);
    }

    /// Takes effect on the next trigger
    pub fn set_pull_order(&self, pull_order: PullOrder) {
        let options = {
            let mut state = self.lock_state();
            state.options.pull_order = pull_order;
            state.options
        };
        self.emit_pool_options_changed(options);
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn emit_source_list_changed(&self) {
        self.inner.events.emit_lossy(PlayoutEvent::SourceListChanged {
            sources: self.list_sources(),
            timestamp: playout_common::time::now(),
        });
    }

    fn emit_pool_list_changed(&self) {
        self.inner.events.emit_lossy(PlayoutEvent::PoolListChanged {
            pool: self.pool_members(),
            timestamp: playout_common::time::now(),
        });
    }

    fn emit_pool_options_changed(&self, options: AutoPoolOptions) {
        self.inner.events.emit_lossy(PlayoutEvent::PoolOptionsChanged {
            options,
            timestamp: playout_common::time::now(),
        });
    }
}

impl ManagerInner {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn pool_members(&self) -> Vec<PoolMember> {
        self.lock_state()
            .sources
            .iter()
            .map(|s| PoolMember {
                id: s.source.id(),
                name: s.source.name().to_string(),
                in_pool: s.in_pool,
            })
            .collect()
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        if let Some(handle) = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for ContentSourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("ContentSourceManager")
            .field("options", &state.options)
            .field("sources", &state.sources.len())
            .field("refill", &state.refill)
            .finish()
    }
}
