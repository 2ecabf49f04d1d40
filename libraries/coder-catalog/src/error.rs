//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur when querying the video catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Catalog returned an error response
    #[error("Catalog error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No API key available
    #[error("API key required")]
    CredentialRequired,

    /// Invalid catalog base URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse catalog response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
