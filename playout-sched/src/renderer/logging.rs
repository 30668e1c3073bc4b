//! Renderer that only logs what it is asked to do
//!
//! Used when no real backend is configured for a media type, and by the
//! service binary for dry runs.

use super::Renderer;
use crate::error::RendererError;
use async_trait::async_trait;
use playout_common::MediaObject;
use std::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct LoggingState {
    loaded: Option<MediaObject>,
    playing: bool,
}

/// Renderer that tracks loaded media and logs every call
#[derive(Debug)]
pub struct LoggingRenderer {
    name: String,
    state: Mutex<LoggingState>,
}

impl LoggingRenderer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(LoggingState::default()),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.with_state(|state| state.playing)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LoggingState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }
}

#[async_trait]
impl Renderer for LoggingRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load_media(&self, media: &MediaObject) -> Result<(), RendererError> {
        let already_loaded = self.with_state(|state| {
            if state.loaded.as_ref() == Some(media) {
                true
            } else {
                state.loaded = Some(media.clone());
                state.playing = false;
                false
            }
        });

        if already_loaded {
            debug!("[{}] '{}' already loaded", self.name, media.name());
        } else {
            info!("[{}] Loaded '{}' from {}", self.name, media.name(), media.location());
        }
        Ok(())
    }

    async fn play(&self) -> Result<(), RendererError> {
        let name = self.with_state(|state| {
            let name = state.loaded.as_ref().map(|m| m.name().to_string());
            if name.is_some() {
                state.playing = true;
            }
            name
        });
        match name {
            Some(name) => {
                info!("[{}] Playing '{}'", self.name, name);
                Ok(())
            }
            None => Err(RendererError::NothingLoaded),
        }
    }

    async fn unload_media(&self) -> Result<(), RendererError> {
        let unloaded = self.with_state(|state| {
            state.playing = false;
            state.loaded.take()
        });
        if let Some(media) = unloaded {
            debug!("[{}] Unloaded '{}'", self.name, media.name());
        }
        Ok(())
    }

    async fn restart_media(&self) -> Result<(), RendererError> {
        let name = self.with_state(|state| {
            let name = state.loaded.as_ref().map(|m| m.name().to_string());
            if name.is_some() {
                state.playing = true;
            }
            name
        });
        match name {
            Some(name) => {
                info!("[{}] Restarted '{}'", self.name, name);
                Ok(())
            }
            None => Err(RendererError::NothingLoaded),
        }
    }

    async fn focus(&self) -> Result<(), RendererError> {
        debug!("[{}] Focused", self.name);
        Ok(())
    }

    fn loaded_media(&self) -> Option<MediaObject> {
        self.with_state(|state| state.loaded.clone())
    }
}
