//! Evaluation of programs against one scene
//!
//! An [`ExecutionContext`] borrows a single [`Scene`] for its whole
//! lifetime. Everything it memoizes (node outputs, `same_<attribute>`
//! tables) is therefore scoped to that scene and dropped with it.
//!
//! # Node identity
//!
//! Node outputs are keyed by structure, not by position in a program: a
//! node's key is interned from its operation kind, its side inputs and the
//! keys of its inputs. Two programs sharing a sub-DAG share cached outputs,
//! and a rewritten program can never observe an output computed for a
//! different structure.

use crate::error::EngineResult;
use crate::handlers::{self, SceneMemo};
use crate::op::OpKind;
use crate::program::{Program, SideInput};
use crate::value::{Outcome, Value};
use raven_scene::Scene;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Evaluation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Reuse node outputs across evaluations on the same scene
    pub cache_outputs: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { cache_outputs: true }
    }
}

/// Counters collected while evaluating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Handler calls actually made
    pub handlers_invoked: usize,
    /// Node outputs served from the cache
    pub cache_hits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NodeShape {
    kind: OpKind,
    side_inputs: Vec<SideInput>,
    inputs: Vec<usize>,
}

/// Evaluator bound to one scene
#[derive(Debug)]
pub struct ExecutionContext<'s> {
    scene: &'s Scene,
    options: EvalOptions,
    memo: SceneMemo,
    keys: HashMap<NodeShape, usize>,
    outputs: HashMap<usize, Outcome>,
    stats: ExecutionStats,
}

impl<'s> ExecutionContext<'s> {
    /// Context with default options
    #[must_use]
    pub fn new(scene: &'s Scene) -> Self {
        Self::with_options(scene, EvalOptions::default())
    }

    /// Context with explicit options
    #[must_use]
    pub fn with_options(scene: &'s Scene, options: EvalOptions) -> Self {
        Self {
            scene,
            options,
            memo: SceneMemo::default(),
            keys: HashMap::new(),
            outputs: HashMap::new(),
            stats: ExecutionStats::default(),
        }
    }

    /// The scene this context evaluates against
    #[inline]
    #[must_use]
    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    /// Counters so far
    #[inline]
    #[must_use]
    pub fn stats(&self) -> ExecutionStats {
        self.stats
    }

    /// Drop cached node outputs; scene tables are kept
    pub fn clear_cache(&mut self) {
        self.outputs.clear();
    }

    /// Answer of the program's last node
    ///
    /// # Errors
    ///
    /// Propagates the first fatal [`crate::EngineError`] raised by a handler.
    pub fn answer(&mut self, program: &Program) -> EngineResult<Outcome> {
        let mut outcomes = self.run(program)?;
        Ok(outcomes.pop().unwrap_or(Outcome::Invalid))
    }

    /// Per-node outcomes up to and including the first `Invalid`
    ///
    /// # Errors
    ///
    /// Same as [`ExecutionContext::answer`].
    pub fn trace(&mut self, program: &Program) -> EngineResult<Vec<Outcome>> {
        self.run(program)
    }

    fn key(&mut self, shape: NodeShape) -> usize {
        let next = self.keys.len();
        *self.keys.entry(shape).or_insert(next)
    }

    fn run(&mut self, program: &Program) -> EngineResult<Vec<Outcome>> {
        let mut outcomes: Vec<Outcome> = Vec::with_capacity(program.len());
        let mut keys: Vec<usize> = Vec::with_capacity(program.len());

        for (index, node) in program.nodes().iter().enumerate() {
            let key = self.key(NodeShape {
                kind: node.kind,
                side_inputs: node.side_inputs.clone(),
                inputs: node.inputs.iter().map(|&i| keys[i]).collect(),
            });
            keys.push(key);

            let cached = if self.options.cache_outputs {
                self.outputs.get(&key).cloned()
            } else {
                None
            };
            let outcome = if let Some(outcome) = cached {
                self.stats.cache_hits += 1;
                outcome
            } else {
                // every earlier outcome is a value: evaluation stops at the first invalid one
                let inputs: Vec<&Value> = node.inputs.iter().filter_map(|&i| outcomes[i].value()).collect();
                trace!(index, op = node.kind.name(), "dispatch");
                self.stats.handlers_invoked += 1;
                let outcome = handlers::dispatch(self.scene, &mut self.memo, node, &inputs)?;
                if self.options.cache_outputs {
                    self.outputs.insert(key, outcome.clone());
                }
                outcome
            };

            let invalid = outcome.is_invalid();
            outcomes.push(outcome);
            if invalid {
                debug!(index, node = %node.label(), remaining = program.len() - index - 1, "invalid outcome, stopping");
                break;
            }
        }
        Ok(outcomes)
    }
}

/// Answer one program against a scene with a fresh context
///
/// # Errors
///
/// Same as [`ExecutionContext::answer`].
pub fn answer_question(scene: &Scene, program: &Program) -> EngineResult<Outcome> {
    ExecutionContext::new(scene).answer(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::PanelAttr;
    use crate::program::ProgramBuilder;
    use raven_scene::{Object, Shape};

    fn scene() -> Scene {
        Scene::from_panels(vec![
            vec![Object::new(Shape::Circle, 3_i64, 1_i64, "center")],
            vec![
                Object::new(Shape::Circle, 3_i64, 1_i64, "left"),
                Object::new(Shape::Square, 5_i64, 2_i64, "right"),
            ],
        ])
    }

    fn panel_program(panel: i64, tail: OpKind) -> Program {
        let mut b = ProgramBuilder::new();
        let s = b.op(OpKind::Scene, &[]);
        let p = b.op_with(OpKind::QueryPanel, &[s], SideInput::number(panel));
        b.op(tail, &[p]);
        b.build().unwrap()
    }

    #[test]
    fn invalid_stops_evaluation() {
        let s = scene();
        let mut b = ProgramBuilder::new();
        let root = b.op(OpKind::Scene, &[]);
        let panel = b.op_with(OpKind::QueryPanel, &[root], SideInput::number(1_i64));
        let one = b.op(OpKind::Unique, &[panel]);
        b.op(OpKind::Query(raven_scene::Attribute::Shape), &[one]);
        let program = b.build().unwrap();

        let mut ctx = ExecutionContext::new(&s);
        let trace = ctx.trace(&program).unwrap();
        assert_eq!(trace.len(), 3);
        assert!(trace[2].is_invalid());
        assert_eq!(ctx.stats().handlers_invoked, 3);
        assert!(ctx.answer(&program).unwrap().is_invalid());
    }

    #[test]
    fn shared_prefixes_hit_the_cache() {
        let s = scene();
        let mut ctx = ExecutionContext::new(&s);
        let count = ctx.answer(&panel_program(1, OpKind::Count)).unwrap();
        assert_eq!(count, Value::Integer(2).into());
        let stats = ctx.stats();
        assert_eq!((stats.handlers_invoked, stats.cache_hits), (3, 0));

        let colors = ctx.answer(&panel_program(1, OpKind::AllEqual(PanelAttr::Color))).unwrap();
        assert_eq!(colors.as_text(), Some("No"));
        let stats = ctx.stats();
        assert_eq!((stats.handlers_invoked, stats.cache_hits), (4, 2));
    }

    #[test]
    fn disabled_cache_reinvokes_handlers() {
        let s = scene();
        let program = panel_program(0, OpKind::Count);
        let mut ctx = ExecutionContext::with_options(&s, EvalOptions { cache_outputs: false });
        let first = ctx.answer(&program).unwrap();
        let second = ctx.answer(&program).unwrap();
        assert_eq!(first, second);
        assert_eq!(ctx.stats().handlers_invoked, 6);
        assert_eq!(ctx.stats().cache_hits, 0);
    }

    #[test]
    fn clear_cache_forces_recomputation() {
        let s = scene();
        let program = panel_program(0, OpKind::Count);
        let mut ctx = ExecutionContext::new(&s);
        ctx.answer(&program).unwrap();
        ctx.clear_cache();
        ctx.answer(&program).unwrap();
        assert_eq!(ctx.stats().handlers_invoked, 6);
    }

    #[test]
    fn answer_question_uses_fresh_context() {
        let out = answer_question(&scene(), &panel_program(0, OpKind::Count)).unwrap();
        assert_eq!(out, Value::Integer(1).into());
    }
}
