//! Operation handlers
//!
//! [`dispatch`] is the single entry point: one exhaustive `match` over
//! [`OpKind`]. Handlers are pure functions of the scene, the resolved
//! input values and the node's side inputs; the only state they touch is
//! the per-scene [`SceneMemo`].

mod compare;
mod position;
mod rules;
mod select;

pub use position::{compare_positions, POSITION_LABELS};
pub use rules::{describe_rule, NO_CLEAR_RULE};

use crate::error::{EngineError, EngineResult};
use crate::op::OpKind;
use crate::program::{Node, SideInput};
use crate::value::{Entity, Outcome, Value};
use raven_scene::{Attribute, Level, Scene, Shape};
use std::collections::{BTreeSet, HashMap};

/// Scratch tables derived from one scene
///
/// Lives exactly as long as the execution context that owns it, so it
/// can never be consulted for a different scene.
#[derive(Debug, Default)]
pub(crate) struct SceneMemo {
    same: HashMap<Attribute, Vec<Vec<usize>>>,
}

impl SceneMemo {
    /// Number of attribute tables built so far
    pub(crate) fn tables(&self) -> usize {
        self.same.len()
    }
}

/// Run the handler of `node` over already-resolved inputs
pub(crate) fn dispatch(
    scene: &Scene,
    memo: &mut SceneMemo,
    node: &Node,
    inputs: &[&Value],
) -> EngineResult<Outcome> {
    let op = node.kind.name();
    let sides = node.side_inputs.as_slice();
    match node.kind {
        OpKind::Scene => Ok(select::scene(scene)),
        OpKind::QueryPanel => select::query_panel(op, inputs[0], &sides[0]),
        OpKind::Filter(attribute) => select::filter(op, scene, inputs[0], attribute, &sides[0]),
        OpKind::Region(region) => select::region(op, scene, inputs[0], region),
        OpKind::Unique => select::unique(op, scene, inputs[0]),
        OpKind::Relate => select::relate(op, scene, inputs[0], &sides[0]),
        OpKind::VgRelate => select::vg_relate(op, scene, inputs[0], &sides[0]),
        OpKind::Union => select::union(op, inputs[0], inputs[1]),
        OpKind::Intersect => select::intersect(op, inputs[0], inputs[1]),
        OpKind::Count => select::count(op, inputs[0]),
        OpKind::Exist => select::exist(op, inputs[0]),
        OpKind::Same(attribute) => select::same(op, scene, memo, inputs[0], attribute),
        OpKind::Equal(_) => compare::equal(op, inputs[0], inputs[1]),
        OpKind::LessThan => compare::less_than(op, inputs[0], inputs[1]),
        OpKind::GreaterThan => compare::greater_than(op, inputs[0], inputs[1]),
        OpKind::Query(attribute) => compare::query(op, scene, inputs[0], attribute),
        OpKind::CompareSize => compare::compare_size(op, inputs[0], inputs[1]),
        OpKind::CompareColor => compare::compare_color(op, inputs[0], inputs[1]),
        OpKind::CompareShape => compare::compare_shape(op, inputs[0], inputs[1]),
        OpKind::CompareNumber => compare::compare_number(op, inputs[0], inputs[1]),
        OpKind::ComparePosition => compare::compare_position(op, inputs[0], inputs[1]),
        OpKind::AllEqual(attribute) => compare::all_equal(op, scene, inputs[0], attribute),
        OpKind::TwoPanel(attribute) => compare::two_panel(op, scene, inputs[0], inputs[1], attribute),
        OpKind::QueryRule(attribute) => rules::query_rule(op, scene, &sides[0], attribute),
    }
}

/// Every panel with flattened indices assigned
pub(crate) fn scene_entities(scene: &Scene) -> Vec<Vec<Entity>> {
    let mut next = 0;
    scene
        .panels
        .iter()
        .map(|panel| {
            panel
                .iter()
                .map(|object| {
                    let entity = Entity {
                        index: next,
                        object: object.clone(),
                    };
                    next += 1;
                    entity
                })
                .collect()
        })
        .collect()
}

fn mismatch(op: &'static str, expected: &'static str, found: &Value) -> EngineError {
    EngineError::type_mismatch(op, expected, found.kind())
}

/// Objects of a collection value; index lists resolve through the scene
fn entities(op: &'static str, scene: &Scene, value: &Value) -> EngineResult<Vec<Entity>> {
    match value {
        Value::Panels(panels) => Ok(panels.iter().flatten().cloned().collect()),
        Value::Objects(objects) => Ok(objects.clone()),
        Value::Indices(indices) => indices.iter().map(|&index| entity(scene, index)).collect(),
        other => Err(mismatch(op, "object collection", other)),
    }
}

fn entity(scene: &Scene, index: usize) -> EngineResult<Entity> {
    scene
        .object(index)
        .map(|object| Entity {
            index,
            object: object.clone(),
        })
        .ok_or(EngineError::ObjectOutOfRange {
            index,
            count: scene.object_count(),
        })
}

fn index_of(op: &'static str, value: &Value) -> EngineResult<usize> {
    match value {
        Value::Index(index) => Ok(*index),
        Value::Object(entity) => Ok(entity.index),
        other => Err(mismatch(op, "object or index", other)),
    }
}

fn index_set(op: &'static str, value: &Value) -> EngineResult<BTreeSet<usize>> {
    match value {
        Value::Indices(indices) => Ok(indices.iter().copied().collect()),
        Value::Objects(objects) => Ok(objects.iter().map(|e| e.index).collect()),
        other => Err(mismatch(op, "object collection", other)),
    }
}

fn collection_len(op: &'static str, value: &Value) -> EngineResult<usize> {
    match value {
        Value::Panels(panels) => Ok(panels.len()),
        Value::Objects(objects) => Ok(objects.len()),
        Value::Indices(indices) => Ok(indices.len()),
        other => Err(mismatch(op, "collection", other)),
    }
}

fn level(op: &'static str, value: &Value) -> EngineResult<Level> {
    match value {
        Value::Level(level) => Ok(*level),
        Value::Integer(n) => Ok(Level::from(*n)),
        Value::Text(text) => Ok(text.parse()?),
        other => Err(mismatch(op, "level", other)),
    }
}

fn shape(op: &'static str, value: &Value) -> EngineResult<Shape> {
    match value {
        Value::Shape(shape) => Ok(*shape),
        Value::Text(text) => Ok(text.parse()?),
        other => Err(mismatch(op, "shape", other)),
    }
}

fn integer(op: &'static str, value: &Value) -> EngineResult<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(mismatch(op, "integer", other)),
    }
}

fn label<'v>(op: &'static str, value: &'v Value) -> EngineResult<&'v str> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(mismatch(op, "position label", other)),
    }
}

fn side_text<'n>(op: &'static str, side: &'n SideInput) -> EngineResult<&'n str> {
    match side {
        SideInput::Text(text) => Ok(text),
        SideInput::Number(level) => Err(EngineError::InvalidSideInput {
            op,
            literal: level.to_string(),
            expected: "text",
        }),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn side_index(op: &'static str, side: &SideInput) -> EngineResult<usize> {
    let value = match side {
        SideInput::Number(level) => Some(level.value()),
        SideInput::Text(text) => text.trim().parse::<f64>().ok(),
    };
    match value {
        Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        _ => Err(EngineError::InvalidSideInput {
            op,
            literal: side.to_string(),
            expected: "a non-negative index",
        }),
    }
}
