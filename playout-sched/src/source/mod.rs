//! Content source contract and factory
//!
//! A content source hands out `ContentBlock`s on demand according to its own
//! policy (random file from a folder, next video of a channel ...). Concrete
//! scanners and fetchers live outside this crate; the only built-in kind is
//! `StaticListSource`, driven purely by configuration.
//!
//! New kinds are added as `SourceConfig` variants so the factory stays
//! exhaustively matched.

mod static_list;

pub use static_list::{ListOrder, StaticListSource};

use crate::error::SourceError;
use async_trait::async_trait;
use playout_common::{AlertBag, ContentBlock, MediaObject, SourceId, SourceInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Producer of queue entries
///
/// `poll` may be invoked repeatedly and concurrently (the auto-pool can pick
/// the same source for several slots of one batch).
#[async_trait]
pub trait ContentSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn name(&self) -> &str;

    /// Kind tag of the implementation, e.g. "StaticList"
    fn kind(&self) -> &str;

    /// Conditions the source has raised about itself
    fn alerts(&self) -> &AlertBag;

    /// Produce the next eligible block
    async fn poll(&self) -> Result<ContentBlock, SourceError>;

    /// Re-scan or reset the candidates the source draws from
    ///
    /// Failures should also be raised as an alert on the source.
    async fn refresh(&self) -> Result<(), SourceError>;
}

/// Build the read model of a registered source
pub fn describe(source: &dyn ContentSource, in_pool: bool) -> SourceInfo {
    SourceInfo {
        id: source.id(),
        name: source.name().to_string(),
        kind: source.kind().to_string(),
        in_pool,
        alerts: source.alerts().snapshot(),
    }
}

/// Configuration of a built-in source kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SourceConfig {
    StaticList {
        name: String,
        #[serde(default)]
        order: ListOrder,
        #[serde(default)]
        media: Vec<MediaObject>,
    },
}

impl SourceConfig {
    /// Source factory
    pub fn build(&self) -> Arc<dyn ContentSource> {
        match self {
            SourceConfig::StaticList { name, order, media } => {
                Arc::new(StaticListSource::new(name.clone(), *order, media.clone()))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SourceConfig::StaticList { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playout_common::MediaType;

    #[test]
    fn test_config_parses_from_toml() {
        let config: SourceConfig = toml::from_str(
            r#"
            kind = "StaticList"
            name = "Interstitials"
            order = "Shuffle"

            [[media]]
            type = "Video"
            name = "bumper"
            location = "/media/bumper.mp4"
            durationMs = 4000
            "#,
        )
        .unwrap();

        match &config {
            SourceConfig::StaticList { name, order, media } => {
                assert_eq!(name, "Interstitials");
                assert_eq!(*order, ListOrder::Shuffle);
                assert_eq!(media.len(), 1);
                assert_eq!(media[0].media_type(), MediaType::Video);
            }
        }
        assert_eq!(config.name(), "Interstitials");
    }

    #[tokio::test]
    async fn test_factory_builds_working_source() {
        let config = SourceConfig::StaticList {
            name: "Loop".to_string(),
            order: ListOrder::Sequential,
            media: vec![MediaObject::new(MediaType::Audio, "a", "/a.ogg", 1000)],
        };
        let source = config.build();
        assert_eq!(source.kind(), "StaticList");

        let block = source.poll().await.unwrap();
        assert_eq!(block.media().name(), "a");

        let info = describe(source.as_ref(), true);
        assert_eq!(info.name, "Loop");
        assert!(info.in_pool);
        assert!(info.alerts.is_empty());
    }
}
