//! Queue operations
//!
//! **Responsibilities:**
//! - Queue mutations (enqueue, insert, remove, update, reorder, clear)
//! - Queue queries (length, entry at index)
//! - QueueChanged emission
//!
//! Each mutation completes under a single write lock and emits while the
//! lock is still held, so observers see changes in mutation order and never
//! a half-applied reorder.

use super::core::Player;
use crate::error::{Error, Result};
use playout_common::ContentBlock;
use tracing::debug;

impl Player {
    /// Append a block to the tail of the queue
    pub async fn enqueue_block(&self, block: ContentBlock) {
        let mut queue = self.inner.queue.write().await;
        debug!("Enqueued '{}' at position {}", block.media().name(), queue.len());
        queue.push(block);
        self.emit_queue_changed(&queue);
    }

    /// Insert a block at `index` (0 = next up)
    ///
    /// Inserting at the head triggers a preload of the new head. `silent`
    /// suppresses the QueueChanged event for multi-step edits.
    pub async fn insert_block_at(&self, index: usize, block: ContentBlock, silent: bool) -> Result<()> {
        {
            let mut queue = self.inner.queue.write().await;
            if index > queue.len() {
                return Err(Error::Queue(format!(
                    "Insert index {} out of range (queue length {})",
                    index,
                    queue.len()
                )));
            }
            debug!("Inserted '{}' at position {}", block.media().name(), index);
            queue.insert(index, block);
            if !silent {
                self.emit_queue_changed(&queue);
            }
        }

        if index == 0 {
            self.preload_next().await;
        }
        Ok(())
    }

    /// Remove and return the block at `index`
    pub async fn remove_block_at(&self, index: usize, silent: bool) -> Result<ContentBlock> {
        let mut queue = self.inner.queue.write().await;
        if index >= queue.len() {
            return Err(Error::Queue(format!(
                "Remove index {} out of range (queue length {})",
                index,
                queue.len()
            )));
        }
        let removed = queue.remove(index);
        debug!("Removed '{}' from position {}", removed.media().name(), index);
        if !silent {
            self.emit_queue_changed(&queue);
        }
        Ok(removed)
    }

    /// Replace the block at `index`
    pub async fn update_block_at(&self, index: usize, block: ContentBlock) -> Result<()> {
        let mut queue = self.inner.queue.write().await;
        let slot = queue.get_mut(index).ok_or_else(|| {
            Error::Queue(format!("Update index {} out of range", index))
        })?;
        *slot = block;
        self.emit_queue_changed(&queue);
        Ok(())
    }

    /// Move the block at `from` so it ends up at `to`
    ///
    /// Emits exactly one QueueChanged. Moving a block to the head preloads it.
    pub async fn reorder_block(&self, from: usize, to: usize) -> Result<()> {
        let mut queue = self.inner.queue.write().await;
        if from >= queue.len() || to >= queue.len() {
            return Err(Error::Queue(format!(
                "Reorder {} -> {} out of range (queue length {})",
                from,
                to,
                queue.len()
            )));
        }
        let block = queue.remove(from);
        queue.insert(to, block);
        self.emit_queue_changed(&queue);
        drop(queue);

        if to == 0 {
            self.preload_next().await;
        }
        Ok(())
    }

    /// Drop every queued block; the current block keeps playing
    pub async fn clear_queue(&self) -> usize {
        let mut queue = self.inner.queue.write().await;
        let cleared = queue.len();
        queue.clear();
        self.emit_queue_changed(&queue);
        cleared
    }

    pub async fn queue_len(&self) -> usize {
        self.inner.queue.read().await.len()
    }

    pub async fn block_in_queue(&self, index: usize) -> Option<ContentBlock> {
        self.inner.queue.read().await.get(index).cloned()
    }

    /// Snapshot of the queue in play order
    pub async fn queue(&self) -> Vec<ContentBlock> {
        self.inner.queue.read().await.clone()
    }
}
