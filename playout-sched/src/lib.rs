//! # Playout Scheduler Library (playout-sched)
//!
//! Content playout scheduling for signage and broadcast-style displays.
//!
//! **Purpose:** Maintain a live queue of content blocks, advance it on a
//! block-duration timer, dispatch each block to the renderer for its media
//! type, and keep the queue topped up from pluggable content sources.
//!
//! **Architecture:** `Player` (queue, timer, renderer focus) observed by the
//! `ContentSourceManager` (auto-pool refill), both driven through the
//! transport-agnostic `ControlRouter`.

pub mod autopool;
pub mod config;
pub mod control;
pub mod error;
pub mod player;
pub mod renderer;
pub mod source;

pub use autopool::{ContentSourceManager, RefillDecision, RefillProgress};
pub use config::PlayoutConfig;
pub use control::ControlRouter;
pub use error::{Error, RendererError, Result, SourceError};
pub use player::{Player, PlayerSettings};
pub use renderer::{Renderer, RendererKind, RendererRegistry};
pub use source::{ContentSource, SourceConfig};
