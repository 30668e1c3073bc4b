//! Source serving blocks from a fixed, configured list of media

use super::ContentSource;
use crate::error::SourceError;
use async_trait::async_trait;
use playout_common::{AlertBag, AlertSeverity, ContentBlock, MediaObject, SourceId};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

const EMPTY_POOL_ALERT: &str = "empty-pool";
const METADATA_ALERT: &str = "metadata";

/// Order in which a `StaticListSource` hands out its media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ListOrder {
    /// Cycle through the list front to back
    #[default]
    Sequential,
    /// Pick uniformly at random on every poll
    Shuffle,
}

/// Content source backed by an in-memory media list
#[derive(Debug)]
pub struct StaticListSource {
    id: SourceId,
    name: String,
    order: ListOrder,
    media: Vec<MediaObject>,
    cursor: AtomicUsize,
    alerts: AlertBag,
}

impl StaticListSource {
    pub fn new(name: impl Into<String>, order: ListOrder, media: Vec<MediaObject>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order,
            media,
            cursor: AtomicUsize::new(0),
            alerts: AlertBag::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }

    fn next_media(&self) -> Option<&MediaObject> {
        match self.order {
            ListOrder::Sequential => {
                if self.media.is_empty() {
                    return None;
                }
                let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.media.len();
                self.media.get(index)
            }
            ListOrder::Shuffle => self.media.choose(&mut rand::thread_rng()),
        }
    }
}

#[async_trait]
impl ContentSource for StaticListSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "StaticList"
    }

    fn alerts(&self) -> &AlertBag {
        &self.alerts
    }

    async fn poll(&self) -> Result<ContentBlock, SourceError> {
        let Some(media) = self.next_media() else {
            self.alerts
                .raise(EMPTY_POOL_ALERT, AlertSeverity::Warning, "No media configured");
            return Err(SourceError::EmptyPool);
        };

        if media.location().is_empty() {
            let reason = format!("'{}' has no location", media.name());
            self.alerts
                .raise(METADATA_ALERT, AlertSeverity::Error, reason.clone());
            return Err(SourceError::MalformedMetadata(reason));
        }

        debug!("[{}] Polled '{}'", self.name, media.name());
        Ok(ContentBlock::new(media.clone()))
    }

    async fn refresh(&self) -> Result<(), SourceError> {
        self.cursor.store(0, Ordering::Relaxed);
        self.alerts.clear_all();
        if self.media.is_empty() {
            self.alerts
                .raise(EMPTY_POOL_ALERT, AlertSeverity::Warning, "No media configured");
            return Err(SourceError::EmptyPool);
        }
        Ok(())
    }
}
