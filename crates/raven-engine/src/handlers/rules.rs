//! Rule-description queries

use super::side_text;
use crate::error::{EngineError, EngineResult};
use crate::op::RuleAttr;
use crate::program::SideInput;
use crate::value::{Outcome, Value};
use raven_scene::{RuleSet, Scene};

/// Answer when no rule entry describes the attribute
pub const NO_CLEAR_RULE: &str = "No clear rule is present.";

const NUMBER_CONSTANT: &str = "The number of objects remains constant.";

/// Fixed description of a rule applied to one attribute
///
/// `value` carries the sign of the rule: `"1"` reads as increase (or sum
/// for `Arithmetic`), anything else as decrease (or difference).
/// Returns `None` for combinations that have no description.
#[must_use]
pub fn describe_rule(name: &str, value: &str, attribute: RuleAttr) -> Option<&'static str> {
    let up = value == "1";
    let pick = |a: &'static str, b: &'static str| if up { a } else { b };
    Some(match (attribute, name) {
        (RuleAttr::Number, "Progression") => pick(
            "The number of objects gradually increases by 1.",
            "The number of objects gradually decreases by 1.",
        ),
        (RuleAttr::Number, "Arithmetic") => pick(
            "The number of objects in the last panel equals the sum of the objects in the previous two panels.",
            "The number of objects in the last panel equals the difference between the objects in the previous two panels.",
        ),
        (RuleAttr::Number, "Distribute_Three") => {
            "The number of objects distributes three distinct values across panels, rotating through each possible permutation of these values."
        }
        (RuleAttr::Number, "Constant") => NUMBER_CONSTANT,

        (RuleAttr::Position, "Arithmetic") => {
            if value == "-1" {
                "If an object is in the first panel but not in the second at corresponding position, it appears in the third panel."
            } else {
                "The position of objects in the last panel is the union of positions from the previous two panels."
            }
        }
        (RuleAttr::Position, "Distribute_Three") => {
            "Three distinct position settings across panels, rotating through each possible permutation of these settings."
        }
        (RuleAttr::Position, "Constant") => "The position of objects does not change across panels.",

        (RuleAttr::Shape, "Progression") => pick(
            "The edge number of shape gradually increases by 1.",
            "The edge number of shape gradually decreases by 1.",
        ),
        (RuleAttr::Shape, "Distribute_Three") => {
            "Three distinct shapes across panels, rotating through each possible permutation of these shapes."
        }
        (RuleAttr::Shape, "Constant") => "The shape remains constant.",

        (RuleAttr::Size, "Progression") => pick(
            "The size of objects gradually increases by a constant amount each time.",
            "The size of objects gradually decreases by a constant amount each time.",
        ),
        (RuleAttr::Size, "Arithmetic") => pick(
            "The size of objects in the last panel is the sum of the sizes in the previous two panels.",
            "The size of objects in the last panel is the difference between the sizes in the previous two panels.",
        ),
        (RuleAttr::Size, "Distribute_Three") => {
            "Three distinct sizes across panels, rotating through each possible permutation of these sizes."
        }
        (RuleAttr::Size, "Constant") => "The size remains constant.",

        (RuleAttr::Color, "Progression") => pick(
            "The color of objects gradually darkens by a constant amount each time.",
            "The color of objects gradually brightens by a constant amount each time.",
        ),
        (RuleAttr::Color, "Arithmetic") => pick(
            "The color of objects in the last panel is the sum of the colors in the previous two panels.",
            "The color of objects in the last panel is the difference between the colors in the previous two panels.",
        ),
        (RuleAttr::Color, "Distribute_Three") => {
            "Three distinct colors across panels, rotating through each possible permutation of these colors."
        }
        (RuleAttr::Color, "Constant") => "The color remains constant.",

        _ => return None,
    })
}

/// Rule-set index and uniformity key for a section discriminator
fn section(side: &str) -> (usize, &str) {
    match side {
        "Normal" => (0, "Grid"),
        "Left" | "Up" | "Out" => (0, side),
        _ => (1, side),
    }
}

pub(super) fn query_rule(op: &'static str, scene: &Scene, side: &SideInput, attribute: RuleAttr) -> EngineResult<Outcome> {
    let (index, key) = section(side_text(op, side)?);
    let set: &RuleSet = scene.rules.get(index).ok_or(EngineError::MissingRules(index))?;

    // equal counts settle the number rule before any uniformity is read
    if attribute == RuleAttr::Number {
        let mut counts = scene.panels.iter().map(Vec::len);
        if let Some(first) = counts.next() {
            if counts.all(|n| n == first) {
                return Ok(Value::text(NUMBER_CONSTANT).into());
            }
        }
    }

    let uniform = set
        .uniformity
        .get(key)
        .ok_or_else(|| EngineError::MissingUniformity(key.to_string()))?;

    let Some(rule) = set.find(attribute.tag()) else {
        return Ok(Value::text(NO_CLEAR_RULE).into());
    };

    let suppressed = matches!(attribute, RuleAttr::Shape | RuleAttr::Size | RuleAttr::Color)
        && !uniform
        && rule.name == "Constant"
        && set
            .first()
            .is_some_and(|first| (first.attr == "Position" && first.name == "Arithmetic") || first.attr == "Number");
    if suppressed {
        return Ok(Value::text(NO_CLEAR_RULE).into());
    }

    let text = describe_rule(&rule.name, &rule.value, attribute).unwrap_or(NO_CLEAR_RULE);
    Ok(Value::text(text).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raven_scene::{Object, Rule, Shape, Uniformity};

    fn rule_set(rules: Vec<Rule>, flags: &[(&str, bool)]) -> RuleSet {
        RuleSet {
            rules,
            uniformity: flags.iter().map(|&(k, v)| (k.to_string(), v)).collect::<Uniformity>(),
        }
    }

    fn scene_with(counts: &[usize], sets: Vec<RuleSet>) -> Scene {
        let panels = counts
            .iter()
            .map(|&n| (0..n).map(|_| Object::new(Shape::Square, 1_i64, 1_i64, "center")).collect())
            .collect();
        Scene::from_panels(panels).with_rules(sets)
    }

    fn ask(scene: &Scene, side: &str, attribute: RuleAttr) -> String {
        query_rule("query_rule", scene, &SideInput::text(side), attribute)
            .unwrap()
            .as_text()
            .unwrap()
            .to_string()
    }

    #[test]
    fn describes_progression_direction() {
        assert_eq!(
            describe_rule("Progression", "1", RuleAttr::Color),
            Some("The color of objects gradually darkens by a constant amount each time.")
        );
        assert_eq!(
            describe_rule("Progression", "-1", RuleAttr::Shape),
            Some("The edge number of shape gradually decreases by 1.")
        );
        assert_eq!(describe_rule("Arithmetic", "1", RuleAttr::Shape), None);
        assert_eq!(describe_rule("Mystery", "1", RuleAttr::Size), None);
    }

    #[test]
    fn number_rule_is_constant_when_counts_agree() {
        let set = rule_set(vec![Rule::new("Number/Position", "Progression", "1")], &[("Grid", true)]);
        let scene = scene_with(&[2, 2, 2], vec![set.clone()]);
        assert_eq!(ask(&scene, "Normal", RuleAttr::Number), NUMBER_CONSTANT);

        let scene = scene_with(&[1, 2, 3], vec![set]);
        assert_eq!(
            ask(&scene, "Normal", RuleAttr::Number),
            "The number of objects gradually increases by 1."
        );
    }

    #[test]
    fn constant_number_needs_no_uniformity() {
        let set = rule_set(vec![Rule::new("Number", "Progression", "1")], &[]);
        let scene = scene_with(&[1, 1, 1], vec![set.clone()]);
        assert_eq!(ask(&scene, "Normal", RuleAttr::Number), NUMBER_CONSTANT);

        let scene = scene_with(&[1, 2, 3], vec![set]);
        assert!(matches!(
            query_rule("query_number_rule", &scene, &SideInput::text("Normal"), RuleAttr::Number),
            Err(EngineError::MissingUniformity(key)) if key == "Grid"
        ));
    }

    #[test]
    fn side_selects_rule_set() {
        let left = rule_set(vec![Rule::new("Size", "Constant", "0")], &[("Left", true)]);
        let right = rule_set(vec![Rule::new("Size", "Progression", "-1")], &[("Right", true)]);
        let scene = scene_with(&[1, 1, 1], vec![left, right]);
        assert_eq!(ask(&scene, "Left", RuleAttr::Size), "The size remains constant.");
        assert_eq!(
            ask(&scene, "Right", RuleAttr::Size),
            "The size of objects gradually decreases by a constant amount each time."
        );
        assert_eq!(ask(&scene, "Left", RuleAttr::Color), NO_CLEAR_RULE);
    }

    #[test]
    fn non_uniform_constant_is_suppressed() {
        let rules = vec![
            Rule::new("Number", "Progression", "1"),
            Rule::new("Type", "Constant", "0"),
        ];
        let scene = scene_with(&[1, 2, 3], vec![rule_set(rules.clone(), &[("Grid", false)])]);
        assert_eq!(ask(&scene, "Normal", RuleAttr::Shape), NO_CLEAR_RULE);

        let scene = scene_with(&[1, 2, 3], vec![rule_set(rules, &[("Grid", true)])]);
        assert_eq!(ask(&scene, "Normal", RuleAttr::Shape), "The shape remains constant.");
    }

    #[test]
    fn missing_rule_data_is_fatal() {
        let scene = scene_with(&[1], vec![rule_set(vec![], &[("Grid", true)])]);
        assert!(matches!(
            query_rule("query_size_rule", &scene, &SideInput::text("Right"), RuleAttr::Size),
            Err(EngineError::MissingRules(1))
        ));
        assert!(matches!(
            query_rule("query_size_rule", &scene, &SideInput::text("Up"), RuleAttr::Size),
            Err(EngineError::MissingUniformity(key)) if key == "Up"
        ));
    }
}
