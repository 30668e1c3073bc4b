//! Renderer double recording every call

use async_trait::async_trait;
use playout_common::MediaObject;
use playout_sched::{Renderer, RendererError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockRenderer {
    name: String,
    loaded: Mutex<Option<MediaObject>>,
    load_log: Mutex<Vec<String>>,
    plays: AtomicUsize,
    unloads: AtomicUsize,
    restarts: AtomicUsize,
    focuses: AtomicUsize,
    fail_load: AtomicBool,
    fail_play: AtomicBool,
}

impl MockRenderer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Names of every media passed to load_media, in call order
    pub fn loads(&self) -> Vec<String> {
        self.load_log.lock().unwrap().clone()
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn unloads(&self) -> usize {
        self.unloads.load(Ordering::SeqCst)
    }

    pub fn restarts(&self) -> usize {
        self.restarts.load(Ordering::SeqCst)
    }

    pub fn focuses(&self) -> usize {
        self.focuses.load(Ordering::SeqCst)
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_media(&self, media: &MediaObject) -> Result<(), RendererError> {
        self.load_log.lock().unwrap().push(media.name().to_string());
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(RendererError::Load {
                media: media.name().to_string(),
                reason: "injected failure".to_string(),
            });
        }
        *self.loaded.lock().unwrap() = Some(media.clone());
        Ok(())
    }

    async fn play(&self) -> Result<(), RendererError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(RendererError::Play("injected failure".to_string()));
        }
        Ok(())
    }

    async fn unload_media(&self) -> Result<(), RendererError> {
        self.unloads.fetch_add(1, Ordering::SeqCst);
        *self.loaded.lock().unwrap() = None;
        Ok(())
    }

    async fn restart_media(&self) -> Result<(), RendererError> {
        self.restarts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn focus(&self) -> Result<(), RendererError> {
        self.focuses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn loaded_media(&self) -> Option<MediaObject> {
        self.loaded.lock().unwrap().clone()
    }
}
