//! Source, selection, relational and set handlers

use super::{
    collection_len, entities, index_of, index_set, mismatch, scene_entities, side_index, side_text,
    SceneMemo,
};
use crate::error::{EngineError, EngineResult};
use crate::op::Region;
use crate::program::SideInput;
use crate::value::{Outcome, Value};
use raven_scene::{Attribute, Literal, Relationships, Scene};

pub(super) fn scene(scene: &Scene) -> Outcome {
    Value::Panels(scene_entities(scene)).into()
}

pub(super) fn query_panel(op: &'static str, input: &Value, side: &SideInput) -> EngineResult<Outcome> {
    let index = side_index(op, side)?;
    match input {
        Value::Panels(panels) => panels
            .get(index)
            .map(|panel| Value::Objects(panel.clone()).into())
            .ok_or(EngineError::PanelOutOfRange {
                index,
                count: panels.len(),
            }),
        other => Err(mismatch(op, "panels", other)),
    }
}

pub(super) fn filter(
    op: &'static str,
    scene: &Scene,
    input: &Value,
    attribute: Attribute,
    side: &SideInput,
) -> EngineResult<Outcome> {
    let literal = match side {
        SideInput::Text(text) => Literal::Text(text),
        SideInput::Number(level) => Literal::Level(*level),
    };
    let kept = entities(op, scene, input)?
        .into_iter()
        .filter(|e| e.object.attribute(attribute).matches(&literal))
        .collect();
    Ok(Value::Objects(kept).into())
}

pub(super) fn region(op: &'static str, scene: &Scene, input: &Value, region: Region) -> EngineResult<Outcome> {
    let kept = entities(op, scene, input)?
        .into_iter()
        .filter(|e| region.contains(&e.object.position))
        .collect();
    Ok(Value::Objects(kept).into())
}

pub(super) fn unique(op: &'static str, scene: &Scene, input: &Value) -> EngineResult<Outcome> {
    if let Value::Indices(indices) = input {
        return Ok(match indices.as_slice() {
            [index] => Value::Index(*index).into(),
            _ => Outcome::Invalid,
        });
    }
    let mut objects = entities(op, scene, input)?;
    Ok(match objects.len() {
        1 => Value::Object(objects.remove(0)).into(),
        _ => Outcome::Invalid,
    })
}

/// Related objects as a set: the stored row is sorted and repeated indices collapse
pub(super) fn relate(op: &'static str, scene: &Scene, input: &Value, side: &SideInput) -> EngineResult<Outcome> {
    let index = index_of(op, input)?;
    let relation = side_text(op, side)?;
    let Some(Relationships::Table(table)) = &scene.relationships else {
        return Err(EngineError::MissingRelationships { op, form: "table" });
    };
    let rows = table
        .get(relation)
        .ok_or_else(|| EngineError::UnknownRelation(relation.to_string()))?;
    let row = rows.get(index).ok_or(EngineError::ObjectOutOfRange {
        index,
        count: rows.len(),
    })?;
    let mut related = row.clone();
    related.sort_unstable();
    related.dedup();
    Ok(Value::Indices(related).into())
}

pub(super) fn vg_relate(op: &'static str, scene: &Scene, input: &Value, side: &SideInput) -> EngineResult<Outcome> {
    let index = index_of(op, input)?;
    let predicate = side_text(op, side)?;
    let Some(Relationships::Edges(edges)) = &scene.relationships else {
        return Err(EngineError::MissingRelationships { op, form: "edge-list" });
    };
    let mut related: Vec<usize> = edges
        .iter()
        .filter(|edge| edge.predicate == predicate && edge.subject_idx == index)
        .map(|edge| edge.object_idx)
        .collect();
    related.sort_unstable();
    related.dedup();
    Ok(Value::Indices(related).into())
}

pub(super) fn union(op: &'static str, left: &Value, right: &Value) -> EngineResult<Outcome> {
    let mut set = index_set(op, left)?;
    set.extend(index_set(op, right)?);
    Ok(Value::Indices(set.into_iter().collect()).into())
}

pub(super) fn intersect(op: &'static str, left: &Value, right: &Value) -> EngineResult<Outcome> {
    let left = index_set(op, left)?;
    let right = index_set(op, right)?;
    Ok(Value::Indices(left.intersection(&right).copied().collect()).into())
}

pub(super) fn count(op: &'static str, input: &Value) -> EngineResult<Outcome> {
    let len = collection_len(op, input)?;
    Ok(Value::Integer(i64::try_from(len).unwrap_or(i64::MAX)).into())
}

pub(super) fn exist(op: &'static str, input: &Value) -> EngineResult<Outcome> {
    Ok(Value::yes_no(collection_len(op, input)? > 0).into())
}

pub(super) fn same(
    op: &'static str,
    scene: &Scene,
    memo: &mut SceneMemo,
    input: &Value,
    attribute: Attribute,
) -> EngineResult<Outcome> {
    let index = index_of(op, input)?;
    let table = memo.same.entry(attribute).or_insert_with(|| {
        let objects: Vec<_> = scene.objects().collect();
        objects
            .iter()
            .enumerate()
            .map(|(i, a)| {
                objects
                    .iter()
                    .enumerate()
                    .filter(|&(j, b)| i != j && a.attribute(attribute) == b.attribute(attribute))
                    .map(|(j, _)| j)
                    .collect()
            })
            .collect()
    });
    let count = table.len();
    table
        .get(index)
        .map(|others| Value::Indices(others.clone()).into())
        .ok_or(EngineError::ObjectOutOfRange { index, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Entity;
    use raven_scene::{Object, RelationEdge, Shape};
    use std::collections::BTreeMap;

    fn two_panel_scene() -> Scene {
        Scene::from_panels(vec![
            vec![
                Object::new(Shape::Circle, 3_i64, 2_i64, "left"),
                Object::new(Shape::Square, 5_i64, 2_i64, "right"),
            ],
            vec![Object::new(Shape::Circle, 3_i64, 4_i64, "left")],
        ])
    }

    fn objects(outcome: &Outcome) -> Vec<usize> {
        match outcome.value() {
            Some(Value::Objects(objects)) => objects.iter().map(|e| e.index).collect(),
            other => panic!("expected objects, got {other:?}"),
        }
    }

    #[test]
    fn scene_assigns_flat_indices() {
        let Outcome::Value(Value::Panels(panels)) = scene(&two_panel_scene()) else {
            panic!("scene must produce panels");
        };
        let indices: Vec<Vec<usize>> = panels
            .iter()
            .map(|p| p.iter().map(|e: &Entity| e.index).collect())
            .collect();
        assert_eq!(indices, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn query_panel_selects_and_bounds_checks() {
        let s = two_panel_scene();
        let all = scene(&s).into_value().unwrap();
        let second = query_panel("query_panel", &all, &SideInput::number(1_i64)).unwrap();
        assert_eq!(objects(&second), vec![2]);
        assert!(matches!(
            query_panel("query_panel", &all, &SideInput::number(5_i64)),
            Err(EngineError::PanelOutOfRange { index: 5, count: 2 })
        ));
    }

    #[test]
    fn filter_flattens_panels() {
        let s = two_panel_scene();
        let all = scene(&s).into_value().unwrap();
        let circles = filter("filter_shape", &s, &all, Attribute::Shape, &SideInput::text("circle")).unwrap();
        assert_eq!(objects(&circles), vec![0, 2]);
        let dark = filter("filter_color", &s, &all, Attribute::Color, &SideInput::number(5_i64)).unwrap();
        assert_eq!(objects(&dark), vec![1]);
    }

    #[test]
    fn unique_requires_exactly_one() {
        let s = two_panel_scene();
        let all = scene(&s).into_value().unwrap();
        assert!(unique("unique", &s, &all).unwrap().is_invalid());
        let one = Value::Indices(vec![4]);
        assert_eq!(unique("unique", &s, &one).unwrap(), Value::Index(4).into());
        assert!(unique("unique", &s, &Value::Indices(vec![])).unwrap().is_invalid());
    }

    #[test]
    fn relate_reads_table_rows_sorted() {
        let table = BTreeMap::from([("left".to_string(), vec![vec![2, 1, 2], vec![], vec![]])]);
        let s = two_panel_scene().with_relationships(Relationships::Table(table));
        let out = relate("relate", &s, &Value::Index(0), &SideInput::text("left")).unwrap();
        assert_eq!(out, Value::Indices(vec![1, 2]).into());
        assert!(matches!(
            relate("relate", &s, &Value::Index(0), &SideInput::text("behind")),
            Err(EngineError::UnknownRelation(name)) if name == "behind"
        ));
        assert!(matches!(
            vg_relate("vg_relate_handler", &s, &Value::Index(0), &SideInput::text("left")),
            Err(EngineError::MissingRelationships { form: "edge-list", .. })
        ));
    }

    #[test]
    fn vg_relate_collects_sorted_unique_targets() {
        let edge = |p: &str, s, o| RelationEdge {
            predicate: p.to_string(),
            subject_idx: s,
            object_idx: o,
        };
        let s = two_panel_scene().with_relationships(Relationships::Edges(vec![
            edge("above", 0, 2),
            edge("above", 0, 1),
            edge("above", 0, 2),
            edge("below", 0, 1),
            edge("above", 1, 0),
        ]));
        let out = vg_relate("vg_relate_handler", &s, &Value::Index(0), &SideInput::text("above")).unwrap();
        assert_eq!(out, Value::Indices(vec![1, 2]).into());
    }

    #[test]
    fn set_algebra_is_sorted() {
        let a = Value::Indices(vec![3, 1]);
        let b = Value::Indices(vec![2, 3]);
        assert_eq!(union("union", &a, &b).unwrap(), Value::Indices(vec![1, 2, 3]).into());
        assert_eq!(intersect("intersect", &a, &b).unwrap(), Value::Indices(vec![3]).into());
    }

    #[test]
    fn same_excludes_self() {
        let s = two_panel_scene();
        let mut memo = SceneMemo::default();
        let out = same("same_shape", &s, &mut memo, &Value::Index(0), Attribute::Shape).unwrap();
        assert_eq!(out, Value::Indices(vec![2]).into());
        let out = same("same_size", &s, &mut memo, &Value::Index(2), Attribute::Size).unwrap();
        assert_eq!(out, Value::Indices(vec![]).into());
        assert_eq!(memo.tables(), 2);
    }

    #[test]
    fn count_and_exist() {
        assert_eq!(count("count", &Value::Indices(vec![1, 2])).unwrap(), Value::Integer(2).into());
        assert_eq!(exist("exist", &Value::Objects(vec![])).unwrap(), Value::text("No").into());
        assert!(count("count", &Value::Integer(3)).is_err());
    }
}
