//! Error types for factify-core

use thiserror::Error;

/// Main error type for factify-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service error: {0}")]
    Generation(String),

    #[error("Search service error: {0}")]
    Search(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for factify-core
pub type Result<T> = std::result::Result<T, Error>;
