//! Node output values

use raven_scene::{Level, Object, Shape};
use serde::Serialize;
use std::fmt;

/// An object together with its flattened scene index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Index into the scene's flattened object sequence
    pub index: usize,
    /// The object itself
    pub object: Object,
}

/// Output of a node that produced a well-defined answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// All panels of a scene
    Panels(Vec<Vec<Entity>>),
    /// A collection of objects
    Objects(Vec<Entity>),
    /// One object
    Object(Entity),
    /// Sorted, deduplicated object indices
    Indices(Vec<usize>),
    /// One object index
    Index(usize),
    /// Count
    Integer(i64),
    /// Color or size level
    Level(Level),
    /// Shape
    Shape(Shape),
    /// Free text answer
    Text(String),
    /// Truth value
    Bool(bool),
}

impl Value {
    /// Kind name used in type mismatch errors
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Panels(_) => "panels",
            Value::Objects(_) => "objects",
            Value::Object(_) => "object",
            Value::Indices(_) => "indices",
            Value::Index(_) => "index",
            Value::Integer(_) => "integer",
            Value::Level(_) => "level",
            Value::Shape(_) => "shape",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
        }
    }

    /// Text value from a string slice
    #[must_use]
    pub fn text(text: &str) -> Self {
        Value::Text(text.to_string())
    }

    /// `"Yes"` or `"No"`
    #[must_use]
    pub fn yes_no(flag: bool) -> Self {
        Value::text(if flag { "Yes" } else { "No" })
    }

    /// Borrow the text of a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Panels(panels) => write!(f, "<{} panels>", panels.len()),
            Value::Objects(objects) => write!(f, "<{} objects>", objects.len()),
            Value::Object(entity) => write!(f, "<object {}>", entity.index),
            Value::Indices(indices) => write!(f, "{indices:?}"),
            Value::Index(index) => write!(f, "{index}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Level(level) => write!(f, "{level}"),
            Value::Shape(shape) => write!(f, "{shape}"),
            Value::Text(text) => f.write_str(text),
            Value::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

/// Result of evaluating one node
///
/// `Invalid` means the sub-question has no well-defined answer for the
/// scene. It is data, not an error, and stops evaluation of the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Well-defined answer
    Value(Value),
    /// No well-defined answer
    Invalid,
}

impl Outcome {
    /// Whether this is the invalid outcome
    #[inline]
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Outcome::Invalid)
    }

    /// The value, if any
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Invalid => None,
        }
    }

    /// Consume into the value, if any
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Invalid => None,
        }
    }

    /// Text answer, if this is a text value
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value().and_then(Value::as_text)
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Value(value)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(value) => value.fmt(f),
            Outcome::Invalid => f.write_str("__INVALID__"),
        }
    }
}
