//! Error types for the sahayak scheduling assistant.

use thiserror::Error;

/// Main error type for sahayak operations.
#[derive(Error, Debug)]
pub enum SahayakError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Responder error: {0}")]
    Responder(#[from] ResponderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Errors from the external calendar collaborator.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Calendar unavailable: {0}")]
    Unavailable(String),

    #[error("Event rejected: {0}")]
    Rejected(String),

    #[error("Timeout after {0}s")]
    Timeout(u64),
}

/// Errors from the conversational responder collaborator.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Empty completion")]
    EmptyCompletion,
}

/// Result type alias for sahayak operations.
pub type Result<T> = std::result::Result<T, SahayakError>;
