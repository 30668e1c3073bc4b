//! Media data model
//!
//! `MediaObject` describes something playable; `ContentBlock` wraps it with
//! an identity so it can sit in the play queue.
//!
//! Both types are immutable once built: fields are private and only exposed
//! through accessors. Renderers compare `MediaObject`s structurally to decide
//! whether a load request is a no-op.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Queue entry identifier
pub type BlockId = Uuid;

/// Media type tag used to route a block to its renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MediaType {
    Video,
    Audio,
    Image,
    WebPage,
    LiveStream,
}

impl MediaType {
    /// All media types, in declaration order
    pub const ALL: [MediaType; 5] = [
        MediaType::Video,
        MediaType::Audio,
        MediaType::Image,
        MediaType::WebPage,
        MediaType::LiveStream,
    ];
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Video => write!(f, "Video"),
            MediaType::Audio => write!(f, "Audio"),
            MediaType::Image => write!(f, "Image"),
            MediaType::WebPage => write!(f, "WebPage"),
            MediaType::LiveStream => write!(f, "LiveStream"),
        }
    }
}

/// Immutable description of a playable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaObject {
    #[serde(rename = "type")]
    media_type: MediaType,
    name: String,
    /// Opaque reference understood by the renderer (path, URL, ...)
    location: String,
    /// Play duration; `None` means indefinite (live input, static graphic)
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
}

impl MediaObject {
    /// Create media with a finite play duration
    pub fn new(
        media_type: MediaType,
        name: impl Into<String>,
        location: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            media_type,
            name: name.into(),
            location: location.into(),
            duration_ms: Some(duration_ms),
            thumbnail: None,
        }
    }

    /// Create media that plays until explicitly advanced
    pub fn indefinite(
        media_type: MediaType,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            media_type,
            name: name.into(),
            location: location.into(),
            duration_ms: None,
            thumbnail: None,
        }
    }

    /// Return a copy carrying the given thumbnail reference
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Play duration as a `Duration`, `None` when indefinite
    pub fn duration(&self) -> Option<Duration> {
        self.duration_ms.map(Duration::from_millis)
    }

    pub fn is_indefinite(&self) -> bool {
        self.duration_ms.is_none()
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

/// One queue entry: a media object plus its identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    id: BlockId,
    media: MediaObject,
}

impl ContentBlock {
    /// Wrap media in a new block with a fresh v4 identifier
    pub fn new(media: MediaObject) -> Self {
        Self {
            id: Uuid::new_v4(),
            media,
        }
    }

    /// Wrap media under an existing identifier
    pub fn with_id(id: BlockId, media: MediaObject) -> Self {
        Self { id, media }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn media(&self) -> &MediaObject {
        &self.media
    }

    pub fn media_type(&self) -> MediaType {
        self.media.media_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_media_duration() {
        let media = MediaObject::new(MediaType::Video, "intro", "/media/intro.mp4", 5000);
        assert_eq!(media.duration_ms(), Some(5000));
        assert_eq!(media.duration(), Some(Duration::from_secs(5)));
        assert!(!media.is_indefinite());
    }

    #[test]
    fn test_indefinite_media() {
        let media = MediaObject::indefinite(MediaType::Image, "idle", "/media/idle.png");
        assert!(media.is_indefinite());
        assert!(media.duration().is_none());
    }

    #[test]
    fn test_blocks_get_distinct_ids() {
        let media = MediaObject::new(MediaType::Audio, "jingle", "/media/jingle.ogg", 3000);
        let a = ContentBlock::new(media.clone());
        let b = ContentBlock::new(media);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.media(), b.media());
    }

    #[test]
    fn test_media_serialized_shape() {
        let media = MediaObject::new(MediaType::WebPage, "ticker", "https://example.org/t", 10_000)
            .with_thumbnail("ticker.jpg");
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["type"], "WebPage");
        assert_eq!(json["durationMs"], 10_000);
        assert_eq!(json["thumbnail"], "ticker.jpg");
    }

    #[test]
    fn test_missing_duration_deserializes_as_indefinite() {
        let media: MediaObject = serde_json::from_str(
            r#"{"type":"LiveStream","name":"cam","location":"rtmp://cam/live"}"#,
        )
        .unwrap();
        assert!(media.is_indefinite());
        assert_eq!(media.media_type(), MediaType::LiveStream);
    }
}
