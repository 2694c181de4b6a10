//! Error types for program construction and evaluation
//!
//! Two failure families exist:
//! - [`ProgramError`]: the program itself is malformed (unknown operation,
//!   wrong arity, forward reference). Raised once, at construction.
//! - [`EngineError`]: evaluation hit a combination the handlers cannot
//!   answer (type mismatch, missing scene data, unmapped position pair).
//!
//! Neither covers the invalid outcome, which is ordinary data
//! ([`crate::Outcome::Invalid`]).

use raven_scene::SceneError;

/// Errors raised while building a [`crate::Program`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    /// Operation name not in the closed operation set
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),

    /// Program has no nodes
    #[error("program has no nodes")]
    Empty,

    /// Node references itself or a later node
    #[error("node {node} references input {input}, inputs must point to earlier nodes")]
    ForwardReference { node: usize, input: usize },

    /// Wrong number of inputs
    #[error("node {node} ({op}) takes {expected} inputs, got {actual}")]
    InputArity {
        node: usize,
        op: &'static str,
        expected: String,
        actual: usize,
    },

    /// Wrong number of side inputs
    #[error("node {node} ({op}) takes {expected} side inputs, got {actual}")]
    SideInputArity {
        node: usize,
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Substitution index outside the program
    #[error("substitution index {index} out of range for program of {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised during evaluation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Handler received a value of the wrong kind
    #[error("{op} expected {expected}, got {found}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Position pair absent from the directional table
    #[error("no direction defined from '{from}' to '{to}'")]
    UnmappedPositionPair { from: String, to: String },

    /// Scene has no relationship data
    #[error("{op} requires {form} relationships, scene has none of that form")]
    MissingRelationships { op: &'static str, form: &'static str },

    /// Relation name not in the relationship table
    #[error("unknown relation: '{0}'")]
    UnknownRelation(String),

    /// Object index outside the scene
    #[error("object index {index} out of range for scene of {count} objects")]
    ObjectOutOfRange { index: usize, count: usize },

    /// Panel index outside the scene
    #[error("panel index {index} out of range for scene of {count} panels")]
    PanelOutOfRange { index: usize, count: usize },

    /// Side input literal has the wrong form
    #[error("{op} side input '{literal}' is not {expected}")]
    InvalidSideInput {
        op: &'static str,
        literal: String,
        expected: &'static str,
    },

    /// Requested rule-set missing from the scene
    #[error("scene has no rule-set at index {0}")]
    MissingRules(usize),

    /// Requested uniformity flag missing from the rule-set
    #[error("rule-set has no uniformity flag for section '{0}'")]
    MissingUniformity(String),

    /// Program construction failed
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// Scene data failed to decode
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl EngineError {
    /// Create type mismatch error
    pub fn type_mismatch(op: &'static str, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            op,
            expected,
            found,
        }
    }

    /// Create unmapped position pair error
    pub fn unmapped_position(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnmappedPositionPair {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Result type for evaluation
pub type EngineResult<T> = Result<T, EngineError>;
