//! Attribute value types
//!
//! Shapes are ordered by edge count, colors and sizes are ordered scalar
//! levels. Both orderings drive the pairwise comparison questions.

use crate::error::SceneError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// One of the five panel shapes, ordered by edge count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    /// 3 edges
    Triangle,
    /// 4 edges
    Square,
    /// 5 edges
    Pentagon,
    /// 6 edges
    Hexagon,
    /// Counted as 7 edges
    Circle,
}

impl Shape {
    /// All shapes in edge order
    pub const ALL: [Shape; 5] = [
        Shape::Triangle,
        Shape::Square,
        Shape::Pentagon,
        Shape::Hexagon,
        Shape::Circle,
    ];

    /// Edge count used for ordering
    #[inline]
    #[must_use]
    pub fn edges(self) -> u8 {
        match self {
            Shape::Triangle => 3,
            Shape::Square => 4,
            Shape::Pentagon => 5,
            Shape::Hexagon => 6,
            Shape::Circle => 7,
        }
    }

    /// Lowercase name as it appears in scene files
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Shape::Triangle => "triangle",
            Shape::Square => "square",
            Shape::Pentagon => "pentagon",
            Shape::Hexagon => "hexagon",
            Shape::Circle => "circle",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shape::ALL
            .into_iter()
            .find(|shape| shape.name() == s)
            .ok_or_else(|| SceneError::UnknownShape(s.to_string()))
    }
}

impl Serialize for Shape {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered scalar used for color and size
///
/// Equality and hashing go through the bit pattern (with `-0.0`
/// normalised), so levels can key hash maps and sets.
#[derive(Debug, Clone, Copy)]
pub struct Level(f64);

impl Level {
    /// Wrap a raw value
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<i64> for Level {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Level::new(value as f64)
    }
}

impl From<f64> for Level {
    fn from(value: f64) -> Self {
        Level::new(value)
    }
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Level {}

impl Hash for Level {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Level {
    #[allow(clippy::cast_possible_truncation)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Level {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Level::new)
            .ok_or_else(|| SceneError::InvalidLevel(s.to_string()))
    }
}

impl Serialize for Level {
    #[allow(clippy::cast_possible_truncation)]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Level::new(value)),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
