//! Blocks and a player rig backed by mock renderers

use super::MockRenderer;
use playout_common::{ContentBlock, MediaObject, MediaType};
use playout_sched::{Player, PlayerSettings, RendererRegistry};
use std::sync::Arc;
use std::time::Duration;

pub const RESOLUTION: Duration = Duration::from_millis(100);

pub fn block(media_type: MediaType, name: &str, duration_ms: u64) -> ContentBlock {
    ContentBlock::new(MediaObject::new(
        media_type,
        name,
        format!("/media/{}", name),
        duration_ms,
    ))
}

pub fn indefinite(media_type: MediaType, name: &str) -> ContentBlock {
    ContentBlock::new(MediaObject::indefinite(media_type, name, format!("/media/{}", name)))
}

pub fn standby() -> ContentBlock {
    indefinite(MediaType::Image, "standby")
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// Player with one mock renderer each for Image, Video and WebPage
pub struct Rig {
    pub player: Player,
    pub image: Arc<MockRenderer>,
    pub video: Arc<MockRenderer>,
    pub web: Arc<MockRenderer>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_default(standby())
    }

    pub fn with_default(default_block: ContentBlock) -> Self {
        let image = Arc::new(MockRenderer::new("image"));
        let video = Arc::new(MockRenderer::new("video"));
        let web = Arc::new(MockRenderer::new("web"));
        let registry = RendererRegistry::new()
            .with(MediaType::Image, image.clone())
            .with(MediaType::Video, video.clone())
            .with(MediaType::WebPage, web.clone());
        let settings = PlayerSettings::new(default_block).with_timer_resolution(RESOLUTION);
        let player = Player::new(registry, settings).unwrap();
        Self {
            player,
            image,
            video,
            web,
        }
    }
}
