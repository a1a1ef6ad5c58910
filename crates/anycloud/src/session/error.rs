use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while importing or persisting a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The referenced file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The file parsed as JSON but has an unsupported top-level shape.
    #[error("unsupported format: {0}")]
    Format(String),

    /// The file is not valid JSON at all.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
