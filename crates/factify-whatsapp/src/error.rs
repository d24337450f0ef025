//! Error types for factify-whatsapp

use thiserror::Error;

/// factify-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TwiML error: {0}")]
    Xml(String),

    #[error("Core error: {0}")]
    Core(#[from] factify_core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
