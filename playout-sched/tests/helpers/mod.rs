//! Test helper modules for playout-sched integration tests
//!
//! Provides reusable test infrastructure components:
//! - MockRenderer: counts renderer calls, injectable load/play failures
//! - MockSource: counts polls, optional gate to hold polls open
//! - Fixtures: blocks and a player wired to one mock renderer per media type

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_renderer;
pub mod mock_source;

pub use fixtures::{block, indefinite, settle, standby, Rig};
pub use mock_renderer::MockRenderer;
pub use mock_source::MockSource;
