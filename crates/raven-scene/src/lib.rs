//! RAVEN scene model
//!
//! Symbolic descriptions of RAVEN-style puzzle grids: panels of geometric
//! objects, their generative rule records and the pre-rendered template
//! questions stored with each puzzle.
//!
//! # Core Concepts
//!
//! - [`Scene`]: panels plus optional relationships and rule-sets
//! - [`Object`]: shape, color, size and position of one object
//! - [`Shape`] / [`Level`]: ordered attribute values
//! - [`RuleSet`]: rules and parsed uniformity flags for one grid section
//! - [`SceneDocument`]: the full `question.json` of one puzzle

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod attribute;
pub mod error;
pub mod object;
pub mod rules;
pub mod scene;

pub use attribute::{Level, Shape};
pub use error::{SceneError, SceneResult};
pub use object::{AttrValue, Attribute, Literal, Object, Panel, OUTER_PART};
pub use rules::{Rule, RuleSet, Uniformity};
pub use scene::{ChoiceValue, RelationEdge, Relationships, Scene, SceneDocument, TemplateQuestion};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{Attribute, Level, Object, Panel, RuleSet, Scene, SceneDocument, Shape};
}
