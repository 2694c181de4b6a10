//! RAVEN question engine
//!
//! Evaluates question programs (small DAGs of typed operations) against a
//! symbolic RAVEN scene.
//!
//! # Core Concepts
//!
//! - [`OpKind`]: the closed set of operations, dispatched by one `match`
//! - [`Program`]: a node list validated at construction (arity, backward inputs)
//! - [`ExecutionContext`]: evaluator bound to one scene, with a structural
//!   output cache
//! - [`Outcome`]: a [`Value`] or the invalid outcome, which stops evaluation
//! - [`insert_scene_node`] / [`is_degenerate`]: program rewriting and the
//!   redundancy check built on it
//!
//! # Example
//!
//! ```rust,ignore
//! use raven_engine::{answer_question, Program};
//!
//! let program = Program::from_json(r#"{"nodes": [
//!     {"type": "scene", "inputs": []},
//!     {"type": "query_panel", "inputs": [0], "side_inputs": [0]},
//!     {"type": "count", "inputs": [1]}
//! ]}"#)?;
//! let answer = answer_question(&scene, &program)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod context;
pub mod degeneracy;
pub mod error;
mod handlers;
pub mod op;
pub mod program;
pub mod rewrite;
pub mod value;

pub use context::{answer_question, EvalOptions, ExecutionContext, ExecutionStats};
pub use degeneracy::is_degenerate;
pub use error::{EngineError, EngineResult, ProgramError};
pub use handlers::{compare_positions, describe_rule, NO_CLEAR_RULE, POSITION_LABELS};
pub use op::{EqualKind, OpKind, PanelAttr, Region, RuleAttr};
pub use program::{Node, Program, ProgramBuilder, SideInput};
pub use rewrite::{insert_scene_node, used_nodes};
pub use value::{Entity, Outcome, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        answer_question, ExecutionContext, Node, OpKind, Outcome, Program, ProgramBuilder, SideInput, Value,
    };
}
