//! Bootstrap configuration for the playout scheduler
//!
//! Loaded once from TOML at startup; a restart is needed to pick up changes.
//! Every field has a built-in default, so an absent file yields a working
//! (if quiet) setup: logging renderers for every media type, a standby image
//! as default block and no sources.
//!
//! # Settings priority
//!
//! 1. Command-line arguments (--config, --log-level)
//! 2. Environment variable (PLAYOUT_CONFIG)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::error::{Error, Result};
use crate::player::PlayerSettings;
use crate::renderer::{RendererKind, RendererRegistry};
use crate::source::SourceConfig;
use playout_common::config::{load_toml, resolve_config_path, CONFIG_ENV_VAR};
use playout_common::time::millis_to_duration;
use playout_common::{AutoPoolOptions, ContentBlock, MediaObject, MediaType};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayoutConfig {
    /// Tick resolution of the block-duration timer
    ///
    /// Default: 100 ms
    pub timer_resolution_ms: u64,

    /// Fallback content played whenever the queue is empty
    ///
    /// Must have an indefinite duration.
    pub default_block: MediaObject,

    pub auto_pool: AutoPoolOptions,

    /// Renderer per media type
    pub renderers: Vec<RendererConfig>,

    /// Content sources registered at startup, in registration order
    pub sources: Vec<SourceConfig>,

    /// Buffered events per subscriber
    pub event_capacity: usize,

    pub logging: LoggingConfig,
}

/// One `[[renderers]]` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RendererConfig {
    pub media_type: MediaType,
    pub kind: RendererKind,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or EnvFilter directive (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            timer_resolution_ms: 100,
            default_block: MediaObject::indefinite(MediaType::Image, "Standby", "standby.png"),
            auto_pool: AutoPoolOptions::default(),
            renderers: MediaType::ALL
                .iter()
                .map(|&media_type| RendererConfig {
                    media_type,
                    kind: RendererKind::Logging,
                })
                .collect(),
            sources: Vec::new(),
            event_capacity: 256,
            logging: LoggingConfig::default(),
        }
    }
}

impl PlayoutConfig {
    /// Resolve, load and validate the configuration
    ///
    /// Falls back to built-in defaults when no file is found.
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let config = match resolve_config_path(cli_path, CONFIG_ENV_VAR) {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                load_toml::<PlayoutConfig>(&path)?
            }
            None => {
                info!("No configuration file found; using built-in defaults");
                PlayoutConfig::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PlayoutConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timer_resolution_ms == 0 {
            return Err(Error::Config("timer_resolution_ms must be positive".to_string()));
        }
        if !self.default_block.is_indefinite() {
            return Err(Error::Config(format!(
                "Default block '{}' must not have a duration",
                self.default_block.name()
            )));
        }

        let mut seen = BTreeSet::new();
        for renderer in &self.renderers {
            if !seen.insert(renderer.media_type) {
                return Err(Error::Config(format!(
                    "Renderer for {} configured more than once",
                    renderer.media_type
                )));
            }
        }

        let default_type = self.default_block.media_type();
        if !seen.contains(&default_type) {
            return Err(Error::Config(format!(
                "No renderer configured for the default block's media type {}",
                default_type
            )));
        }

        for source in &self.sources {
            let SourceConfig::StaticList { name, media, .. } = source;
            if let Some(orphan) = media.iter().find(|m| !seen.contains(&m.media_type())) {
                return Err(Error::Config(format!(
                    "Source '{}' lists {} media '{}' but no renderer serves that type",
                    name,
                    orphan.media_type(),
                    orphan.name()
                )));
            }
        }
        Ok(())
    }

    pub fn timer_resolution(&self) -> Duration {
        millis_to_duration(self.timer_resolution_ms)
    }

    /// Build the fixed renderer registry
    pub fn renderer_registry(&self) -> RendererRegistry {
        RendererRegistry::from_kinds(self.renderers.iter().map(|r| (r.media_type, r.kind)))
    }

    pub fn player_settings(&self) -> PlayerSettings {
        let mut settings = PlayerSettings::new(ContentBlock::new(self.default_block.clone()))
            .with_timer_resolution(self.timer_resolution());
        settings.event_capacity = self.event_capacity;
        settings
    }
}
