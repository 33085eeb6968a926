//! Error types for autotoll

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response without a usable error body
    #[error("Server returned HTTP {status}")]
    Http { status: u16 },

    /// Backend-reported rejection; the detail text is shown verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
