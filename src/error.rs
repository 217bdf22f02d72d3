//! Error types for receipt fetching, rendering and export

use thiserror::Error;

/// Result type alias for receipt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or exporting a receipt
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Transport failure or unexpected HTTP status from the booking API
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// No booking exists for the confirmation code
    #[error("No booking found for confirmation code {0}")]
    NotFound(String),

    /// The booking API answered with a body we could not understand
    #[error("Failed to decode booking response: {0}")]
    DecodeError(String),

    /// Records were fetched but do not form a usable receipt
    #[error("Invalid booking: {0}")]
    InvalidBooking(String),

    /// Failed to lay out or rasterize content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodeError(String),

    /// Local key/value storage could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// The exported image could not be saved
    #[error("Export failed: {0}")]
    ExportError(String),
}

#[cfg(feature = "http")]
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::ConfigError(format!("invalid URL: {}", err))
    }
}
