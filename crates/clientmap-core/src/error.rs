//! Error types for ClientMap Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected before any call to a collaborator
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Message is the identity provider's, passed through verbatim
    #[error("{0}")]
    Auth(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
