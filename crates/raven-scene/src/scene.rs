//! Scenes and scene documents
//!
//! A [`SceneDocument`] is the raw `question.json` of one puzzle: panels,
//! template questions, rules and relationships. [`Scene`] is the part the
//! evaluator works on.

use crate::error::{SceneError, SceneResult};
use crate::object::{Object, Panel};
use crate::rules::RuleSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One directed edge of an edge-list relationship graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    /// Relation name
    pub predicate: String,
    /// Source object index
    pub subject_idx: usize,
    /// Target object index
    pub object_idx: usize,
}

/// Precomputed object relationships
///
/// Either a table (`relation -> per-object list of related indices`) or a
/// flat list of labelled edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relationships {
    /// `{ "left": [[1, 2], [2], []], ... }`
    Table(BTreeMap<String, Vec<Vec<usize>>>),
    /// `[{ "predicate": "left", "subject_idx": 0, "object_idx": 1 }, ...]`
    Edges(Vec<RelationEdge>),
}

/// Symbolic puzzle scene
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Panels in grid order
    pub panels: Vec<Panel>,
    /// Optional relationship data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
    /// Primary and secondary rule-sets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSet>,
}

impl Scene {
    /// Scene from panels alone
    #[must_use]
    pub fn from_panels(panels: Vec<Panel>) -> Self {
        Self {
            panels,
            relationships: None,
            rules: Vec::new(),
        }
    }

    /// Attach relationships
    #[must_use]
    pub fn with_relationships(mut self, relationships: Relationships) -> Self {
        self.relationships = Some(relationships);
        self
    }

    /// Attach rule-sets
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<RuleSet>) -> Self {
        self.rules = rules;
        self
    }

    /// Number of panels
    #[inline]
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Objects of every panel, flattened in panel order
    ///
    /// Object indices used by relational and co-membership nodes address
    /// this sequence.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.panels.iter().flatten()
    }

    /// Total number of objects
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.panels.iter().map(Vec::len).sum()
    }

    /// Object at a flattened index
    #[must_use]
    pub fn object(&self, index: usize) -> Option<&Object> {
        self.objects().nth(index)
    }

    /// Parse a scene from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] when the text does not match the schema.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Answer choice of a template question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    /// Numeric choice
    Integer(i64),
    /// Textual choice
    Text(String),
}

impl ChoiceValue {
    /// Text form used for matching and lettering
    #[must_use]
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            ChoiceValue::Integer(v) => v.to_string().into(),
            ChoiceValue::Text(v) => v.as_str().into(),
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        ChoiceValue::Text(value.to_string())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        ChoiceValue::Text(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        ChoiceValue::Integer(value)
    }
}

/// Pre-rendered template question stored alongside a scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateQuestion {
    /// Layout configuration name
    pub config: String,
    /// Image path relative to the configuration directory
    pub image_filename: String,
    /// Template file the question was rendered from
    pub template_filename: String,
    /// Original archive file name of the puzzle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Rendered question text
    pub question: String,
    /// Answer choices
    pub choices: Vec<ChoiceValue>,
    /// Correct answer
    pub answer: ChoiceValue,
}

/// Full `question.json` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Panels in grid order
    pub panels: Vec<Panel>,
    /// Template questions rendered for this scene
    #[serde(default)]
    pub questions: Vec<TemplateQuestion>,
    /// Primary and secondary rule-sets
    #[serde(default)]
    pub rules: Vec<RuleSet>,
    /// Optional relationship data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Relationships>,
}

impl SceneDocument {
    /// Parse a document from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Json`] when the text does not match the schema.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a document from disk
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Io`] if the file cannot be read and
    /// [`SceneError::Json`] if it cannot be decoded.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SceneError::io_error(path, e))?;
        let document = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            panels = document.panels.len(),
            questions = document.questions.len(),
            "loaded scene document"
        );
        Ok(document)
    }

    /// Configuration name carried by the first template question
    #[must_use]
    pub fn config(&self) -> Option<&str> {
        self.questions.first().map(|q| q.config.as_str())
    }

    /// Original archive file name carried by the first template question
    #[must_use]
    pub fn original_filename(&self) -> Option<&str> {
        self.questions.first().and_then(|q| q.filename.as_deref())
    }

    /// Evaluator view of the document
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene {
            panels: self.panels.clone(),
            relationships: self.relationships.clone(),
            rules: self.rules.clone(),
        }
    }

    /// Consume the document into its evaluator view
    #[must_use]
    pub fn into_scene(self) -> Scene {
        Scene {
            panels: self.panels,
            relationships: self.relationships,
            rules: self.rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Shape;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "panels": [
            [{"shape": "circle", "color": 3, "size": 4, "position": "left"},
             {"shape": "square", "color": 3, "size": 4, "position": "right"}],
            [{"shape": "triangle", "color": 1, "size": 2, "position": "left"}]
        ],
        "questions": [{
            "config": "left_center_single_right_center_single",
            "image_filename": "7/image.png",
            "template_filename": "reasoning_first_left.json",
            "filename": "RAVEN_7_train.npz",
            "question": "What is the shape of the left part?",
            "choices": ["A", 3],
            "answer": "A"
        }],
        "rules": [
            {"rules": [{"attr": "Number", "name": "Constant", "value": "0"}], "uniformity": "{'Left': True}"},
            {"rules": [], "uniformity": "{'Right': False}"}
        ],
        "relationships": {"left": [[1], [], []]}
    }"#;

    #[test]
    fn document_decodes_all_sections() {
        let doc = SceneDocument::from_json(DOC).unwrap();
        assert_eq!(doc.config(), Some("left_center_single_right_center_single"));
        assert_eq!(doc.original_filename(), Some("RAVEN_7_train.npz"));
        assert_eq!(doc.questions[0].choices[1], ChoiceValue::Integer(3));
        assert_eq!(doc.rules[1].uniformity.get("Right"), Some(false));

        let scene = doc.into_scene();
        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.object(2).map(|o| o.shape), Some(Shape::Triangle));
        assert!(scene.object(3).is_none());
        assert!(matches!(scene.relationships, Some(Relationships::Table(_))));
    }

    #[test]
    fn edge_list_relationships_decode() {
        let rel: Relationships = serde_json::from_str(
            r#"[{"predicate": "above", "subject_idx": 0, "object_idx": 2}]"#,
        )
        .unwrap();
        assert_eq!(
            rel,
            Relationships::Edges(vec![RelationEdge {
                predicate: "above".into(),
                subject_idx: 0,
                object_idx: 2,
            }])
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("question.json");
        assert!(matches!(SceneDocument::load(&missing), Err(SceneError::Io { .. })));

        std::fs::write(&missing, DOC).unwrap();
        assert_eq!(SceneDocument::load(&missing).unwrap().panels.len(), 2);
    }

    #[test]
    fn choice_text_form() {
        assert_eq!(ChoiceValue::from(4_i64).as_text(), "4");
        assert_eq!(ChoiceValue::from("Yes").as_text(), "Yes");
    }
}
