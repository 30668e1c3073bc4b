//! Error types for playout-sched
//!
//! Defines module-specific error types using thiserror. Renderer and source
//! failures have their own enums because they cross the trait boundary to
//! externally implemented backends.

use playout_common::{MediaType, SourceId};
use thiserror::Error;

/// Main error type for playout-sched
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors bubbled up from the common crate (config file I/O, parsing)
    #[error(transparent)]
    Common(#[from] playout_common::Error),

    /// No renderer registered for a media type
    #[error("No renderer registered for media type {0}")]
    MissingRenderer(MediaType),

    /// Renderer operation failed
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),

    /// Content source operation failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Queue index or mutation errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// Unknown content source
    #[error("Source not found: {0}")]
    SourceNotFound(SourceId),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed control request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// JSON (de)serialization of control payloads
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures reported by a renderer backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RendererError {
    #[error("failed to load '{media}': {reason}")]
    Load { media: String, reason: String },

    #[error("failed to start playback: {0}")]
    Play(String),

    #[error("failed to unload media: {0}")]
    Unload(String),

    #[error("failed to restart media: {0}")]
    Restart(String),

    #[error("no media loaded")]
    NothingLoaded,
}

/// Failures reported by a content source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Backing store could not be read (permissions, network share, API)
    #[error("access error: {0}")]
    Access(String),

    /// Source has no eligible candidates left
    #[error("source has no eligible content")]
    EmptyPool,

    /// A candidate had unusable metadata
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),

    /// Source is temporarily unable to serve
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type using playout-sched Error
pub type Result<T> = std::result::Result<T, Error>;
