//! Error types for scene loading

use std::path::PathBuf;

/// Errors raised while decoding a scene document
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Document is not valid JSON for the scene schema
    #[error("invalid scene document: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Uniformity literal could not be parsed
    #[error("malformed uniformity literal at offset {offset}: {message}")]
    Uniformity { offset: usize, message: String },

    /// Shape name outside the five known shapes
    #[error("unknown shape: '{0}'")]
    UnknownShape(String),

    /// Scalar attribute is neither a number nor a numeric string
    #[error("invalid level value: '{0}'")]
    InvalidLevel(String),
}

impl SceneError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create uniformity parse error at a byte offset
    pub fn uniformity(offset: usize, message: impl Into<String>) -> Self {
        Self::Uniformity {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
