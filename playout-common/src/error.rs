//! Common error types for the playout workspace

use thiserror::Error;

/// Common result type for playout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the playout crates
#[derive(Error, Debug)]
pub enum Error {
    /// TOML configuration could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
