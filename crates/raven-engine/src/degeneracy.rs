//! Degeneracy check for relational programs
//!
//! A program is degenerate when one of its `relate` hops can be replaced
//! by the whole scene without changing the answer: the relation carried
//! no information.

use crate::context::ExecutionContext;
use crate::error::EngineResult;
use crate::op::OpKind;
use crate::program::Program;
use crate::rewrite::insert_scene_node;
use crate::value::Outcome;
use tracing::debug;

/// Whether any `relate` node of `program` is redundant
///
/// `baseline` is the program's own answer when the caller already has it;
/// otherwise it is computed once here. Stops at the first redundant node.
///
/// # Errors
///
/// Propagates evaluation and rewrite errors.
pub fn is_degenerate(
    ctx: &mut ExecutionContext<'_>,
    program: &Program,
    baseline: Option<Outcome>,
) -> EngineResult<bool> {
    let baseline = match baseline {
        Some(outcome) => outcome,
        None => ctx.answer(program)?,
    };

    for (index, node) in program.nodes().iter().enumerate() {
        if node.kind != OpKind::Relate {
            continue;
        }
        let rewritten = insert_scene_node(program, index)?;
        if ctx.answer(&rewritten)? == baseline {
            debug!(index, node = %node.label(), "relate node is redundant");
            return Ok(true);
        }
    }
    Ok(false)
}
