//! Application error types.
//!
//! Conversion itself never fails - converters are best-effort and skip
//! malformed input. [`AppError`] covers everything around the conversion
//! core: configuration loading, I/O, JSON parsing, and the backend
//! collaborator boundary.

use thiserror::Error;

/// Application-level errors for anygraph.
#[derive(Error, Debug)]
pub enum AppError {
    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    // I/O and parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    // Dispatch errors
    #[error("Unknown query language: {0}")]
    UnknownLanguage(String),

    // Backend collaborator errors
    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

impl AppError {
    /// Convenience constructor for driver adapter failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
