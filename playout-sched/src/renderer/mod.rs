//! Renderer contract and media-type registry
//!
//! A renderer presents one media type (a video decoder, a browser overlay, an
//! image compositor ...). The scheduler only talks to renderers through the
//! `Renderer` trait; concrete backends live outside this crate except for the
//! built-in `LoggingRenderer`.
//!
//! The `RendererRegistry` maps every media type to exactly one renderer. It
//! is built once at startup and never changes afterwards.

mod logging;

pub use logging::LoggingRenderer;

use crate::error::{Error, RendererError, Result};
use async_trait::async_trait;
use playout_common::{MediaObject, MediaType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Rendering backend for one media type
///
/// Every operation must be idempotent for repeated identical calls and must
/// settle (never hang) when the requested state is already in effect. In
/// particular `load_media` with media equal to `loaded_media()` resolves
/// immediately without re-initializing.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &str;

    /// Prepare `media` for playback without starting it
    async fn load_media(&self, media: &MediaObject) -> std::result::Result<(), RendererError>;

    /// Start playing the loaded media
    async fn play(&self) -> std::result::Result<(), RendererError>;

    /// Stop and release whatever is loaded
    async fn unload_media(&self) -> std::result::Result<(), RendererError>;

    /// Seek the loaded media back to its start and keep playing
    async fn restart_media(&self) -> std::result::Result<(), RendererError>;

    /// Bring this renderer's output to the front (e.g. make visible)
    async fn focus(&self) -> std::result::Result<(), RendererError> {
        Ok(())
    }

    /// Media currently loaded, if any
    fn loaded_media(&self) -> Option<MediaObject>;
}

/// Built-in renderer kinds that can be created from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RendererKind {
    /// Logs every call and tracks loaded media; no actual output
    Logging,
}

impl RendererKind {
    /// Factory for built-in renderers
    pub fn build(self, media_type: MediaType) -> Arc<dyn Renderer> {
        match self {
            RendererKind::Logging => Arc::new(LoggingRenderer::new(format!(
                "logging-{}",
                media_type.to_string().to_lowercase()
            ))),
        }
    }
}

/// Fixed mapping from media type to renderer
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<MediaType, Arc<dyn Renderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration; a later call for the same type replaces
    /// the earlier renderer
    pub fn with(mut self, media_type: MediaType, renderer: Arc<dyn Renderer>) -> Self {
        self.renderers.insert(media_type, renderer);
        self
    }

    /// Build a registry from configured renderer kinds
    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = (MediaType, RendererKind)>,
    {
        kinds
            .into_iter()
            .fold(Self::new(), |registry, (media_type, kind)| {
                registry.with(media_type, kind.build(media_type))
            })
    }

    pub fn get(&self, media_type: MediaType) -> Option<&Arc<dyn Renderer>> {
        self.renderers.get(&media_type)
    }

    /// Like `get`, but a missing registration is a configuration error
    pub fn require(&self, media_type: MediaType) -> Result<&Arc<dyn Renderer>> {
        self.get(media_type)
            .ok_or(Error::MissingRenderer(media_type))
    }

    pub fn contains(&self, media_type: MediaType) -> bool {
        self.renderers.contains_key(&media_type)
    }

    /// Every registration except `media_type`'s renderer
    ///
    /// A single renderer instance may serve several media types; it is only
    /// listed when it is not also the renderer for `media_type`.
    pub fn others(&self, media_type: MediaType) -> Vec<(MediaType, Arc<dyn Renderer>)> {
        let focused = self.renderers.get(&media_type);
        let mut candidates: Vec<_> = self
            .renderers
            .iter()
            .filter(|(t, r)| {
                **t != media_type && focused.map_or(true, |f| !Arc::ptr_eq(f, r))
            })
            .map(|(t, r)| (*t, Arc::clone(r)))
            .collect();
        candidates.sort_by_key(|(t, _)| *t);

        let mut others: Vec<(MediaType, Arc<dyn Renderer>)> = Vec::with_capacity(candidates.len());
        for (t, r) in candidates {
            if !others.iter().any(|(_, seen)| Arc::ptr_eq(seen, &r)) {
                others.push((t, r));
            }
        }
        others
    }

    pub fn media_types(&self) -> Vec<MediaType> {
        let mut types: Vec<_> = self.renderers.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.renderers.iter().map(|(t, r)| (t, r.name())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kinds_registers_each_type() {
        let registry = RendererRegistry::from_kinds([
            (MediaType::Video, RendererKind::Logging),
            (MediaType::Image, RendererKind::Logging),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(MediaType::Video));
        assert!(registry.get(MediaType::Audio).is_none());
        assert_eq!(registry.media_types(), vec![MediaType::Video, MediaType::Image]);
    }

    #[test]
    fn test_require_reports_missing_type() {
        let registry = RendererRegistry::new();
        match registry.require(MediaType::WebPage) {
            Err(Error::MissingRenderer(MediaType::WebPage)) => {}
            other => panic!("expected MissingRenderer, got {:?}", other.map(|r| r.name().to_string())),
        }
    }

    #[test]
    fn test_others_excludes_focused_and_shared_instances() {
        let shared: Arc<dyn Renderer> = Arc::new(LoggingRenderer::new("shared"));
        let image: Arc<dyn Renderer> = Arc::new(LoggingRenderer::new("image"));
        let registry = RendererRegistry::new()
            .with(MediaType::Video, Arc::clone(&shared))
            .with(MediaType::LiveStream, Arc::clone(&shared))
            .with(MediaType::Image, Arc::clone(&image));

        let others = registry.others(MediaType::Video);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].0, MediaType::Image);

        let others = registry.others(MediaType::Image);
        assert_eq!(others.len(), 1);
        assert!(Arc::ptr_eq(&others[0].1, &shared));
    }
}
