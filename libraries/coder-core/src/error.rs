/// Core error types for Coder Music
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Coder Music
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Credential was empty or whitespace only
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Track is missing a required field
    #[error("Invalid track: {0}")]
    InvalidTrack(String),
}
