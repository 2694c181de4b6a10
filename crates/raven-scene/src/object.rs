//! Panel objects and attribute accessors

use crate::attribute::{Level, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One geometric object inside a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Shape, ordered by edge count
    pub shape: Shape,
    /// Color level (higher is darker in rendered panels)
    pub color: Level,
    /// Size level
    pub size: Level,
    /// Categorical position label, e.g. `top-left` or `outer-part`
    pub position: String,
    /// Optional list-valued category tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectcategory: Vec<String>,
}

/// A panel is an ordered list of objects
pub type Panel = Vec<Object>;

/// Object attributes addressable by filter, query and co-membership nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    /// `color`
    Color,
    /// `shape`
    Shape,
    /// `size`
    Size,
    /// `position`
    Position,
    /// `objectcategory`
    Category,
}

impl Attribute {
    /// Name used in operation suffixes (`filter_<name>`)
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Color => "color",
            Attribute::Shape => "shape",
            Attribute::Size => "size",
            Attribute::Position => "position",
            Attribute::Category => "objectcategory",
        }
    }

    /// Parse an operation suffix
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "color" => Some(Attribute::Color),
            "shape" => Some(Attribute::Shape),
            "size" => Some(Attribute::Size),
            "position" => Some(Attribute::Position),
            "objectcategory" => Some(Attribute::Category),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed view of one attribute of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValue<'a> {
    /// Shape attribute
    Shape(Shape),
    /// Color or size
    Level(Level),
    /// Position label
    Label(&'a str),
    /// List-valued attribute
    Labels(&'a [String]),
}

impl AttrValue<'_> {
    /// Whether a filter literal selects this value
    ///
    /// Labels match on equality or substring, lists on membership.
    #[must_use]
    pub fn matches(&self, literal: &Literal<'_>) -> bool {
        match (self, literal) {
            (AttrValue::Shape(shape), Literal::Text(text)) => shape.name() == *text,
            (AttrValue::Level(level), Literal::Level(value)) => level == value,
            (AttrValue::Level(level), Literal::Text(text)) => {
                text.parse::<Level>().is_ok_and(|value| value == *level)
            }
            (AttrValue::Label(label), Literal::Text(text)) => label.contains(text),
            (AttrValue::Labels(labels), Literal::Text(text)) => {
                labels.iter().any(|label| label == text)
            }
            _ => false,
        }
    }
}

/// Constant operand of a filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal<'a> {
    /// Textual literal (shape name, position label, category)
    Text(&'a str),
    /// Numeric literal (color or size level)
    Level(Level),
}

impl Object {
    /// Create an object without category tags
    pub fn new(shape: Shape, color: impl Into<Level>, size: impl Into<Level>, position: impl Into<String>) -> Self {
        Self {
            shape,
            color: color.into(),
            size: size.into(),
            position: position.into(),
            objectcategory: Vec::new(),
        }
    }

    /// Borrow one attribute
    #[must_use]
    pub fn attribute(&self, attribute: Attribute) -> AttrValue<'_> {
        match attribute {
            Attribute::Color => AttrValue::Level(self.color),
            Attribute::Shape => AttrValue::Shape(self.shape),
            Attribute::Size => AttrValue::Level(self.size),
            Attribute::Position => AttrValue::Label(&self.position),
            Attribute::Category => AttrValue::Labels(&self.objectcategory),
        }
    }

    /// Whether the object sits in the outer frame of a nested layout
    #[inline]
    #[must_use]
    pub fn is_outer_part(&self) -> bool {
        self.position == OUTER_PART
    }
}

/// Position label of the outer frame in nested layouts
pub const OUTER_PART: &str = "outer-part";

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(position: &str) -> Object {
        Object::new(Shape::Square, 3_i64, 2_i64, position)
    }

    #[test]
    fn label_filters_match_substrings() {
        let obj = square_at("top-left of the inner part");
        let value = obj.attribute(Attribute::Position);
        assert!(value.matches(&Literal::Text("top-left of the inner part")));
        assert!(value.matches(&Literal::Text("inner")));
        assert!(!value.matches(&Literal::Text("outer")));
    }

    #[test]
    fn level_filters_accept_numeric_text() {
        let obj = square_at("center");
        assert!(obj.attribute(Attribute::Color).matches(&Literal::Text("3")));
        assert!(obj.attribute(Attribute::Color).matches(&Literal::Level(Level::from(3_i64))));
        assert!(!obj.attribute(Attribute::Size).matches(&Literal::Text("3")));
    }

    #[test]
    fn category_filters_check_membership() {
        let mut obj = square_at("center");
        obj.objectcategory = vec!["polygon".into(), "convex".into()];
        assert!(obj.attribute(Attribute::Category).matches(&Literal::Text("convex")));
        assert!(!obj.attribute(Attribute::Category).matches(&Literal::Text("con")));
    }

    #[test]
    fn attribute_names_roundtrip() {
        for attr in [
            Attribute::Color,
            Attribute::Shape,
            Attribute::Size,
            Attribute::Position,
            Attribute::Category,
        ] {
            assert_eq!(Attribute::from_name(attr.name()), Some(attr));
        }
        assert_eq!(Attribute::from_name("material"), None);
    }

    #[test]
    fn object_deserializes_without_category() {
        let obj: Object = serde_json::from_str(
            r#"{"shape": "circle", "color": 5, "size": 0.6, "position": "outer-part", "angle": 90}"#,
        )
        .unwrap();
        assert_eq!(obj.shape, Shape::Circle);
        assert!(obj.objectcategory.is_empty());
        assert!(obj.is_outer_part());
    }
}
