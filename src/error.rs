//! Error types for the converter

use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting an SVG to a PNG
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read the input SVG
    #[error("Failed to read input: {0}")]
    InputError(String),

    /// The browser-based script pre-processor failed
    #[error("Browser processing failed: {0}")]
    BrowserError(String),

    /// A rasterizer backend failed to produce a PNG
    #[error("Rasterization failed: {0}")]
    RenderError(String),

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// No rasterizer backend is available on this system
    #[error("No rendering backends available")]
    NoBackends,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::InputError(err.to_string())
    }
}

#[cfg(feature = "browser")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::BrowserError(err.to_string())
    }
}
