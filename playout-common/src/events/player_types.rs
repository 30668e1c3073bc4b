//! Snapshot types carried by player and pool events

use crate::media::ContentBlock;
use crate::pool::SourceId;
use serde::{Deserialize, Serialize};

/// Read-only snapshot of the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    /// Block currently on air (None before the first transition)
    pub current_block: Option<ContentBlock>,
    /// Elapsed play time of the current block, in timer ticks
    pub progress_ms: u64,
    /// Queued blocks in play order (never contains the current block)
    pub queue: Vec<ContentBlock>,
}

impl PlayerState {
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

/// Auto-pool membership entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMember {
    pub id: SourceId,
    pub name: String,
    pub in_pool: bool,
}
