//! Error types for the support agent backend

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Domain Errors
    // =============================

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    #[error("Provider transport error: {0}")]
    ProviderTransport(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
