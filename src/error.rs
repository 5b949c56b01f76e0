//! Error types for Pensum.

use thiserror::Error;

/// Library-level error type for Pensum operations.
#[derive(Error, Debug)]
pub enum PensumError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Knowledge store creation failed: {0}")]
    StoreCreation(String),

    #[error("Knowledge store validation failed: {0}")]
    StoreValidation(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl PensumError {
    /// Whether this error is guidance for the user (bad input, material
    /// that cannot yield text) rather than an infrastructure failure.
    /// Guidance errors are shown to the user and must never be forwarded
    /// into a model prompt.
    pub fn is_user_guidance(&self) -> bool {
        matches!(
            self,
            PensumError::InvalidInput(_) | PensumError::Extraction(_)
        )
    }
}

/// Result type alias for Pensum operations.
pub type Result<T> = std::result::Result<T, PensumError>;
