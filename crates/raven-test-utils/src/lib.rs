//! Testing utilities for the RAVEN workspace
//!
//! Shared scene, program and document fixtures.

#![allow(missing_docs)]

use raven_engine::{OpKind, Program, ProgramBuilder, SideInput};
use raven_scene::{
    Attribute, ChoiceValue, Object, Panel, Relationships, Rule, RuleSet, Scene, SceneDocument, Shape,
    TemplateQuestion, Uniformity,
};
use std::collections::BTreeMap;

pub const ATTRIBUTE_PHRASES: [&str; 4] = ["the position of", "the shape of", "the size of", "the color of"];

pub fn create_object(shape: Shape, color: i64, size: i64, position: &str) -> Object {
    Object::new(shape, color, size, position)
}

/// One object per panel, all at `center`; colors 1, 2, 3 and sizes 3, 3, 3
pub fn create_center_single_panels() -> Vec<Panel> {
    vec![
        vec![create_object(Shape::Triangle, 1, 3, "center")],
        vec![create_object(Shape::Square, 2, 3, "center")],
        vec![create_object(Shape::Pentagon, 3, 3, "center")],
    ]
}

/// Corner objects; panel 2 mixes shapes and sizes
pub fn create_distribute_four_panels() -> Vec<Panel> {
    vec![
        vec![
            create_object(Shape::Circle, 2, 4, "top-left"),
            create_object(Shape::Circle, 2, 4, "bottom-right"),
        ],
        vec![
            create_object(Shape::Circle, 2, 4, "top-left"),
            create_object(Shape::Hexagon, 2, 5, "top-right"),
            create_object(Shape::Circle, 2, 4, "bottom-left"),
        ],
        vec![
            create_object(Shape::Square, 4, 2, "top-left"),
            create_object(Shape::Square, 4, 2, "top-right"),
            create_object(Shape::Square, 4, 2, "bottom-left"),
            create_object(Shape::Square, 4, 2, "bottom-right"),
        ],
    ]
}

pub fn create_left_right_panels() -> Vec<Panel> {
    (1..=3)
        .map(|i| {
            vec![
                create_object(Shape::Triangle, i, 2, "left"),
                create_object(Shape::Circle, 3, i + 1, "right"),
            ]
        })
        .collect()
}

pub fn create_up_down_panels() -> Vec<Panel> {
    (1..=3)
        .map(|i| {
            vec![
                create_object(Shape::Square, 5, i, "top"),
                create_object(Shape::Hexagon, i, 3, "bottom"),
            ]
        })
        .collect()
}

/// Outer frame plus inner quadrant objects
pub fn create_in_out_panels() -> Vec<Panel> {
    vec![
        vec![
            create_object(Shape::Square, 0, 6, "outer-part"),
            create_object(Shape::Circle, 2, 2, "top-left of the inner part"),
        ],
        vec![
            create_object(Shape::Square, 0, 6, "outer-part"),
            create_object(Shape::Circle, 2, 2, "top-left of the inner part"),
            create_object(Shape::Circle, 4, 2, "bottom-right of the inner part"),
        ],
        vec![
            create_object(Shape::Square, 0, 6, "outer-part"),
            create_object(Shape::Triangle, 3, 2, "top-right of the inner part"),
            create_object(Shape::Triangle, 3, 2, "bottom-left of the inner part"),
            create_object(Shape::Triangle, 3, 2, "bottom-right of the inner part"),
        ],
    ]
}

/// Panels for a configuration name
pub fn create_panels(config: &str) -> Vec<Panel> {
    match config {
        "distribute_four" | "distribute_nine" => create_distribute_four_panels(),
        "left_center_single_right_center_single" => create_left_right_panels(),
        "up_center_single_down_center_single" => create_up_down_panels(),
        "in_center_single_out_center_single" | "in_distribute_four_out_center_single" => create_in_out_panels(),
        _ => create_center_single_panels(),
    }
}

pub fn create_scene() -> Scene {
    Scene::from_panels(create_center_single_panels())
}

pub fn create_scene_with_relations() -> Scene {
    let table = BTreeMap::from([
        ("left".to_string(), vec![vec![], vec![0], vec![0, 1]]),
        ("right".to_string(), vec![vec![1, 2], vec![2], vec![]]),
    ]);
    Scene::from_panels(vec![vec![
        create_object(Shape::Circle, 1, 2, "top-left"),
        create_object(Shape::Square, 1, 3, "top-center"),
        create_object(Shape::Circle, 4, 2, "top-right"),
    ]])
    .with_relationships(Relationships::Table(table))
}

pub fn create_rule_set(rules: &[(&str, &str, &str)], uniformity: &[(&str, bool)]) -> RuleSet {
    RuleSet {
        rules: rules
            .iter()
            .map(|&(attr, name, value)| Rule::new(attr, name, value))
            .collect(),
        uniformity: uniformity
            .iter()
            .map(|&(key, flag)| (key.to_string(), flag))
            .collect::<Uniformity>(),
    }
}

/// `scene -> query_panel[panel] -> count`
pub fn create_count_program(panel: i64) -> Program {
    let mut b = ProgramBuilder::new();
    let scene = b.op(OpKind::Scene, &[]);
    let panel = b.op_with(OpKind::QueryPanel, &[scene], SideInput::number(panel));
    b.op(OpKind::Count, &[panel]);
    b.build().unwrap()
}

/// `scene -> filter_shape[shape] -> unique -> relate[relation] -> count`
pub fn create_relate_program(shape: &str, relation: &str) -> Program {
    let mut b = ProgramBuilder::new();
    let scene = b.op(OpKind::Scene, &[]);
    let filtered = b.op_with(OpKind::Filter(Attribute::Shape), &[scene], SideInput::text(shape));
    let one = b.op(OpKind::Unique, &[filtered]);
    let related = b.op_with(OpKind::Relate, &[one], SideInput::text(relation));
    b.op(OpKind::Count, &[related]);
    b.build().unwrap()
}

pub fn create_template(config: &str, template: &str, question: &str, choices: &[&str], answer: &str) -> TemplateQuestion {
    TemplateQuestion {
        config: config.to_string(),
        image_filename: "7/image.png".to_string(),
        template_filename: template.to_string(),
        filename: Some("RAVEN_7_train.npz".to_string()),
        question: question.to_string(),
        choices: choices.iter().map(|&c| ChoiceValue::from(c)).collect(),
        answer: ChoiceValue::from(answer),
    }
}

/// Row-reasoning templates for every attribute, once per section keyword
///
/// An empty keyword list yields the whole-panel templates.
pub fn create_templates(config: &str, keywords: &[&str]) -> Vec<TemplateQuestion> {
    let keywords: Vec<&str> = if keywords.is_empty() { vec![""] } else { keywords.to_vec() };
    let mut out = Vec::new();
    for template in ["reasoning_first.json", "reasoning_second.json"] {
        for keyword in &keywords {
            let scope = if keyword.is_empty() {
                "the panels".to_string()
            } else {
                format!("{keyword} part of the panels")
            };
            out.push(create_template(
                config,
                template,
                &format!("Which rule applies to {scope} in the first row?"),
                &["A: The number of objects remains constant.", "B: The number of objects gradually increases by 1."],
                "A",
            ));
            for phrase in ATTRIBUTE_PHRASES {
                out.push(create_template(
                    config,
                    template,
                    &format!("What describes {phrase} objects in {scope}?"),
                    &["A: It remains constant.", "B: It changes."],
                    "B",
                ));
            }
        }
    }
    out
}

pub fn create_document(config: &str, keywords: &[&str]) -> SceneDocument {
    SceneDocument {
        panels: create_panels(config),
        questions: create_templates(config, keywords),
        rules: vec![create_rule_set(&[("Number/Position", "Constant", "0")], &[("Grid", true)])],
        relationships: None,
    }
}

pub fn create_document_json(config: &str, keywords: &[&str]) -> String {
    serde_json::to_string_pretty(&create_document(config, keywords)).unwrap()
}
