use proptest::prelude::*;
use raven_scene::{Level, Object, RuleSet, Scene, SceneDocument, Shape, Uniformity};
use std::collections::BTreeMap;

fn literal(map: &BTreeMap<String, bool>) -> String {
    let body: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("'{k}': {}", if *v { "True" } else { "False" }))
        .collect();
    format!("{{{}}}", body.join(", "))
}

fn level(n: usize) -> i64 {
    i64::try_from(n).unwrap()
}

proptest! {
    #[test]
    fn prop_level_order_matches_numbers(a in -1000.0..1000.0f64, b in -1000.0..1000.0f64) {
        let (x, y) = (Level::new(a), Level::new(b));
        prop_assert_eq!(x < y, a < b);
        prop_assert_eq!(x == y, a == b);
    }

    #[test]
    fn prop_integral_levels_print_as_integers(n in -10_000i64..10_000) {
        prop_assert_eq!(Level::from(n).to_string(), n.to_string());
        prop_assert_eq!(n.to_string().parse::<Level>().unwrap(), Level::from(n));
    }

    #[test]
    fn prop_uniformity_literal_matches_map(
        map in proptest::collection::btree_map("[A-Za-z]{1,8}", any::<bool>(), 0..6)
    ) {
        let parsed = Uniformity::parse_literal(&literal(&map)).unwrap();
        prop_assert_eq!(parsed.len(), map.len());
        for (key, flag) in &map {
            prop_assert_eq!(parsed.get(key), Some(*flag));
        }
        let json = serde_json::to_value(&parsed).unwrap();
        let from_map: Uniformity = serde_json::from_value(json).unwrap();
        prop_assert_eq!(from_map, parsed);
    }

    #[test]
    fn prop_flat_indices_follow_panel_order(sizes in proptest::collection::vec(0..4usize, 1..5)) {
        let panels: Vec<Vec<Object>> = sizes
            .iter()
            .enumerate()
            .map(|(p, &n)| (0..n).map(|i| Object::new(Shape::Square, level(p), level(i), "center")).collect())
            .collect();
        let scene = Scene::from_panels(panels);
        prop_assert_eq!(scene.object_count(), sizes.iter().sum::<usize>());

        let mut index = 0;
        for (p, &n) in sizes.iter().enumerate() {
            for i in 0..n {
                let object = scene.object(index).unwrap();
                prop_assert_eq!(object.color, Level::from(level(p)));
                prop_assert_eq!(object.size, Level::from(level(i)));
                index += 1;
            }
        }
        prop_assert!(scene.object(index).is_none());
    }
}

#[test]
fn test_document_with_string_uniformity_decodes() {
    let text = r#"{
        "panels": [[{"shape": "circle", "color": 2, "size": 3, "position": "left", "bbox": [0, 0]}]],
        "rules": [{"rules": [{"attr": "Number/Position", "name": "Constant", "value": 0}],
                   "uniformity": "{'Left': True, 'Right': False}"}],
        "questions": []
    }"#;
    let document = SceneDocument::from_json(text).unwrap();
    let rules: &RuleSet = &document.rules[0];
    assert_eq!(rules.uniformity.get("Left"), Some(true));
    assert_eq!(rules.uniformity.get("Right"), Some(false));
    assert_eq!(rules.first().map(|r| r.value.as_str()), Some("0"));

    let scene = document.into_scene();
    assert_eq!(scene.object(0).map(|o| o.shape), Some(Shape::Circle));
    assert!(scene.relationships.is_none());
}
