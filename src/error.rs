//! Error types for videoparser

use thiserror::Error;

/// Reasons a cipher program could not be derived from a player script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("definition object not found")]
    DefinitionNotFound,

    #[error("driver not found")]
    DriverNotFound,

    #[error("no operations recognized")]
    NoOperations,
}

/// Main error type for videoparser operations
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Too many redirects: {0}")]
    TooManyRedirects(String),

    #[error("Playability error ({status}): {reason}")]
    Playability { status: String, reason: String },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Stream {0} has neither a url nor a signature")]
    Unsignable(String),

    #[error("No player asset version discovered yet")]
    MissingAssetVersion,

    #[error("itag {0} not found")]
    FormatNotFound(String),

    #[error("All strategies failed: {0}")]
    AllStrategiesFailed(Box<ParserError>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// Check if error may be surfaced to handler code
    pub fn crosses_boundary(&self) -> bool {
        matches!(
            self,
            ParserError::AllStrategiesFailed(_)
                | ParserError::FormatNotFound(_)
                | ParserError::Unsignable(_)
                | ParserError::MissingAssetVersion
        )
    }

    /// Check if error came from the transport layer
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ParserError::Network(_) | ParserError::Status { .. } | ParserError::TooManyRedirects(_)
        )
    }

    /// Innermost error behind an `AllStrategiesFailed` wrapper
    pub fn root(&self) -> &ParserError {
        match self {
            ParserError::AllStrategiesFailed(inner) => inner.root(),
            other => other,
        }
    }
}
