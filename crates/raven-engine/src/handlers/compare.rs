//! Equality, query, pairwise comparison and consistency handlers

use super::{entities, entity, integer, label, level, mismatch, position, shape};
use crate::error::EngineResult;
use crate::op::PanelAttr;
use crate::value::{Entity, Outcome, Value};
use raven_scene::{Attribute, Scene};
use std::cmp::Ordering;
use std::collections::BTreeSet;

const SAME: &str = "The same";
const NOT_COMPARABLE: &str = "Not comparable";

fn three_way(ordering: Ordering, less: &str, greater: &str) -> Value {
    Value::text(match ordering {
        Ordering::Equal => SAME,
        Ordering::Less => less,
        Ordering::Greater => greater,
    })
}

fn values_equal(op: &'static str, a: &Value, b: &Value) -> EngineResult<bool> {
    Ok(match (a, b) {
        (Value::Level(_) | Value::Integer(_), Value::Level(_) | Value::Integer(_)) => level(op, a)? == level(op, b)?,
        (Value::Shape(_), Value::Text(_)) | (Value::Text(_), Value::Shape(_)) => shape(op, a)? == shape(op, b)?,
        (Value::Object(x), Value::Index(i)) | (Value::Index(i), Value::Object(x)) => x.index == *i,
        _ => a == b,
    })
}

pub(super) fn equal(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(Value::yes_no(values_equal(op, a, b)?).into())
}

pub(super) fn less_than(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(Value::Bool(level(op, a)? < level(op, b)?).into())
}

pub(super) fn greater_than(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(Value::Bool(level(op, a)? > level(op, b)?).into())
}

pub(super) fn query(op: &'static str, scene: &Scene, input: &Value, attribute: Attribute) -> EngineResult<Outcome> {
    let target = match input {
        Value::Object(entity) => entity.clone(),
        Value::Index(index) => entity(scene, *index)?,
        other => return Err(mismatch(op, "object or index", other)),
    };
    let object = &target.object;
    Ok(match attribute {
        Attribute::Color => Value::Level(object.color).into(),
        Attribute::Size => Value::Level(object.size).into(),
        Attribute::Shape => Value::Shape(object.shape).into(),
        Attribute::Position => Value::Text(object.position.clone()).into(),
        Attribute::Category => match object.objectcategory.as_slice() {
            [only] => Value::Text(only.clone()).into(),
            _ => Outcome::Invalid,
        },
    })
}

pub(super) fn compare_size(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(three_way(level(op, a)?.cmp(&level(op, b)?), "Smaller", "Larger").into())
}

/// Color levels grow with darkness: a lower level is the brighter one
pub(super) fn compare_color(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(three_way(level(op, a)?.cmp(&level(op, b)?), "Brighter", "Darker").into())
}

pub(super) fn compare_shape(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(three_way(shape(op, a)?.edges().cmp(&shape(op, b)?.edges()), "Fewer", "More").into())
}

pub(super) fn compare_number(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    Ok(three_way(integer(op, a)?.cmp(&integer(op, b)?), "Fewer", "More").into())
}

pub(super) fn compare_position(op: &'static str, a: &Value, b: &Value) -> EngineResult<Outcome> {
    let direction = position::compare_positions(label(op, a)?, label(op, b)?)?;
    Ok(Value::text(direction).into())
}

fn attribute_of(attribute: PanelAttr) -> Attribute {
    match attribute {
        PanelAttr::Shape => Attribute::Shape,
        PanelAttr::Color => Attribute::Color,
        PanelAttr::Size => Attribute::Size,
        PanelAttr::Position => Attribute::Position,
    }
}

pub(super) fn all_equal(op: &'static str, scene: &Scene, input: &Value, attribute: PanelAttr) -> EngineResult<Outcome> {
    let objects = entities(op, scene, input)?;
    let [first, rest @ ..] = objects.as_slice() else {
        return Ok(Outcome::Invalid);
    };
    if rest.is_empty() {
        return Ok(Outcome::Invalid);
    }
    if attribute == PanelAttr::Size && first.object.is_outer_part() {
        return Ok(Value::yes_no(false).into());
    }
    let key = attribute_of(attribute);
    let shared = first.object.attribute(key);
    Ok(Value::yes_no(rest.iter().all(|e| e.object.attribute(key) == shared)).into())
}

pub(super) fn two_panel(
    op: &'static str,
    scene: &Scene,
    left: &Value,
    right: &Value,
    attribute: PanelAttr,
) -> EngineResult<Outcome> {
    let left = entities(op, scene, left)?;
    let right = entities(op, scene, right)?;

    if attribute == PanelAttr::Position {
        return Ok(Value::yes_no(sorted_positions(&left) == sorted_positions(&right)).into());
    }
    if left.is_empty() || right.is_empty() {
        return Ok(Outcome::Invalid);
    }

    let verdict = match attribute {
        PanelAttr::Shape => shared(&left, |e| e.object.shape)
            .zip(shared(&right, |e| e.object.shape))
            .map(|(a, b)| three_way(a.edges().cmp(&b.edges()), "Fewer", "More")),
        PanelAttr::Color => shared(&left, |e| e.object.color)
            .zip(shared(&right, |e| e.object.color))
            .map(|(a, b)| three_way(a.cmp(&b), "Brighter", "Darker")),
        PanelAttr::Size | PanelAttr::Position => shared(&left, |e| e.object.size)
            .zip(shared(&right, |e| e.object.size))
            .map(|(a, b)| three_way(a.cmp(&b), "Smaller", "Larger")),
    };
    Ok(verdict.unwrap_or_else(|| Value::text(NOT_COMPARABLE)).into())
}

fn sorted_positions(objects: &[Entity]) -> Vec<&str> {
    let mut labels: Vec<&str> = objects.iter().map(|e| e.object.position.as_str()).collect();
    labels.sort_unstable();
    labels
}

/// The one value all objects share, or `None` if they disagree
fn shared<T: Ord>(objects: &[Entity], key: impl Fn(&Entity) -> T) -> Option<T> {
    let mut distinct: BTreeSet<T> = objects.iter().map(key).collect();
    if distinct.len() == 1 {
        distinct.pop_first()
    } else {
        None
    }
}
