//! Event types for the playout event system
//!
//! Each emitting component (Player, ContentSourceManager) owns its own
//! `EventBus`. There is no process-wide dispatcher: observers subscribe to the
//! component they care about, and dropping the returned receiver removes the
//! subscription.

mod player_types;

pub use player_types::{PlayerState, PoolMember};

use crate::media::ContentBlock;
use crate::pool::{AutoPoolOptions, SourceInfo};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Playout event types
///
/// Events are broadcast via `EventBus` and serialize with a `type` tag so
/// external observers (persistence, UI, control surface) can forward them
/// verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayoutEvent {
    /// Queue contents changed
    ///
    /// Fired synchronously right after the in-memory mutation, before any
    /// asynchronous follow-up (preload) is awaited.
    ///
    /// Triggers:
    /// - Auto-pool: check whether a refill is needed
    /// - Observers: update queue display / persist queue
    QueueChanged {
        /// Full queue in play order
        queue: Vec<ContentBlock>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A new block became current
    ///
    /// Fired only after the renderer's play call settled successfully.
    CurrentBlockChanged {
        block: ContentBlock,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Auto-pool membership changed
    PoolListChanged {
        pool: Vec<PoolMember>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Auto-pool options changed
    PoolOptionsChanged {
        options: AutoPoolOptions,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A source was registered, replaced or removed
    SourceListChanged {
        sources: Vec<SourceInfo>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A refill batch was issued
    RefillStarted {
        /// Number of poll slots in the batch
        pulls: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Every slot of the outstanding refill batch settled
    RefillCompleted {
        succeeded: usize,
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlayoutEvent {
    /// Event name, as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayoutEvent::QueueChanged { .. } => "QueueChanged",
            PlayoutEvent::CurrentBlockChanged { .. } => "CurrentBlockChanged",
            PlayoutEvent::PoolListChanged { .. } => "PoolListChanged",
            PlayoutEvent::PoolOptionsChanged { .. } => "PoolOptionsChanged",
            PlayoutEvent::SourceListChanged { .. } => "SourceListChanged",
            PlayoutEvent::RefillStarted { .. } => "RefillStarted",
            PlayoutEvent::RefillCompleted { .. } => "RefillCompleted",
        }
    }
}

/// Broadcast channel owned by a single emitting component
///
/// Sending never blocks. Slow receivers observe `RecvError::Lagged` and
/// should re-read component state rather than rely on the missed events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayoutEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers
    ///   start dropping the oldest ones
    ///
    /// # Examples
    ///
    /// ```
    /// use playout_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(256);
    /// assert_eq!(event_bus.capacity(), 256);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received. Dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayoutEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayoutEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
