//! # Playout Common Library
//!
//! Shared code for the playout workspace including:
//! - Media data model (MediaObject, ContentBlock)
//! - Auto-pool option types
//! - Source alert bag
//! - Event types (PlayoutEvent enum) and the per-component EventBus
//! - Configuration file resolution
//! - Utility functions

pub mod alerts;
pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod pool;
pub mod time;

pub use alerts::{Alert, AlertBag, AlertSeverity};
pub use error::{Error, Result};
pub use events::{EventBus, PlayoutEvent};
pub use media::{BlockId, ContentBlock, MediaObject, MediaType};
pub use pool::{AutoPoolOptions, PullOrder, SourceId, SourceInfo};
