//! Error types for the fitcoach_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitcoach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A catalog row violates a data-integrity invariant (e.g. missing name)
    #[error("Catalog integrity error: {0}")]
    CatalogIntegrity(String),

    /// User store error
    #[error("Store error: {0}")]
    Store(String),

    /// Workout session error
    #[error("Session error: {0}")]
    Session(String),
}
