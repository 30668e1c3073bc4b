//! Content source double

use async_trait::async_trait;
use playout_common::{AlertBag, ContentBlock, MediaObject, MediaType, SourceId};
use playout_sched::{ContentSource, SourceError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

pub struct MockSource {
    id: SourceId,
    name: String,
    alerts: AlertBag,
    polls: AtomicUsize,
    fail: AtomicBool,
    /// When set, every poll waits for one permit before returning
    gate: Option<Arc<Semaphore>>,
}

impl MockSource {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            alerts: AlertBag::new(),
            polls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gate: None,
        }
    }

    /// Source whose polls block until `gate` hands out permits
    pub fn gated(name: &str, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(name)
        }
    }

    pub fn failing(name: &str) -> Self {
        let source = Self::new(name);
        source.fail.store(true, Ordering::SeqCst);
        source
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "Mock"
    }

    fn alerts(&self) -> &AlertBag {
        &self.alerts
    }

    async fn poll(&self) -> Result<ContentBlock, SourceError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable(format!("{} is offline", self.name)));
        }
        Ok(ContentBlock::new(MediaObject::new(
            MediaType::Image,
            format!("{}-{}", self.name, n),
            format!("/{}/{}.png", self.name, n),
            10_000,
        )))
    }

    async fn refresh(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
