//! Error types for question synthesis

use raven_engine::{EngineError, ProgramError};
use raven_scene::SceneError;
use std::path::PathBuf;

/// Errors raised while synthesizing logical-chain questions
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    /// IO error on a dataset path
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scene document failed to load
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Evaluation failed
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Built-in program failed validation
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// Configuration file is not valid TOML for the schema
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Output serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// `.npz` container could not be opened
    #[error("archive error in {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// `.npy` payload is malformed or of an unsupported type
    #[error("malformed array {member} in {path}: {message}")]
    Array {
        path: PathBuf,
        member: String,
        message: String,
    },

    /// Configuration name selects no known layout
    #[error("unknown configuration: '{0}'")]
    UnknownConfig(String),

    /// Document carries no template question to read metadata from
    #[error("document {0} has no template questions")]
    NoTemplates(PathBuf),

    /// Document does not name the puzzle's original file
    #[error("document {0} names no original file")]
    MissingFilename(PathBuf),

    /// Template question for a row stage not found
    #[error("no {template} template for {attribute}{section} in {config}")]
    MissingTemplate {
        config: String,
        template: &'static str,
        attribute: &'static str,
        section: String,
    },

    /// Section of a panel holds no objects to ask about
    #[error("panel {panel} has no objects in {section}")]
    EmptyRegion { panel: usize, section: &'static str },

    /// Panel index beyond the document's panels
    #[error("panel {index} out of range for {count} panels")]
    MissingPanel { index: usize, count: usize },

    /// Question derivation produced an answer of an unexpected form
    #[error("{stage} produced an unexpected answer: {found}")]
    UnexpectedAnswer { stage: String, found: String },
}

impl SynthError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create array decode error
    pub fn array(path: impl Into<PathBuf>, member: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Array {
            path: path.into(),
            member: member.into(),
            message: message.into(),
        }
    }

    /// Whether the error only affects one question and can be skipped
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MissingTemplate { .. } | Self::EmptyRegion { .. })
    }
}

/// Result type for synthesis
pub type SynthResult<T> = Result<T, SynthError>;
