//! Error types for the media widget engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading pages, fetching manifests or driving a
/// media surface.
///
/// Widget controllers never surface these to the UI: prefetch failures degrade
/// to an empty [`SourceMeta`](crate::manifest::SourceMeta) and play rejections
/// are swallowed.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize the HTTP client or platform
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// Failed to load a page document
    #[error("Failed to load URL: {0}")]
    LoadError(String),

    /// Network error (connection refused, timeout, body read)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// A relative reference could not be resolved against its base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The platform refused a programmatic play (autoplay policy)
    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
