//! Generative rule records
//!
//! Scene files carry two rule-sets: one for the whole grid (or the first
//! section of a split layout) and one for the second section. Each set
//! holds per-attribute rule entries and a uniformity map. The uniformity
//! map arrives as a string-encoded mapping literal such as
//! `"{'Grid': True}"`; it is parsed once here at load time.

use crate::error::{SceneError, SceneResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One generative rule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Attribute tag, e.g. `Number/Position`, `Type`, `Size`, `Color`
    pub attr: String,
    /// Rule name: `Progression`, `Arithmetic`, `Distribute_Three`, `Constant`
    pub name: String,
    /// Direction/sign parameter, kept as its textual form (`"1"`, `"-1"`)
    #[serde(deserialize_with = "text_or_number")]
    pub value: String,
}

impl Rule {
    /// Create a rule entry
    pub fn new(attr: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Per-section uniformity flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Uniformity(BTreeMap<String, bool>);

impl Uniformity {
    /// Look up the flag of one section (`Grid`, `Left`, `Up`, `Out`, ...)
    #[must_use]
    pub fn get(&self, section: &str) -> Option<bool> {
        self.0.get(section).copied()
    }

    /// Number of sections present
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a mapping literal of quoted keys and `True`/`False` values
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Uniformity`] on any syntax outside that subset.
    pub fn parse_literal(input: &str) -> SceneResult<Self> {
        LiteralParser::new(input).parse()
    }
}

impl FromIterator<(String, bool)> for Uniformity {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for Uniformity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Literal(String),
            Map(BTreeMap<String, bool>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Literal(text) => Uniformity::parse_literal(&text).map_err(serde::de::Error::custom),
            Raw::Map(map) => Ok(Uniformity(map)),
        }
    }
}

/// Rules and uniformity for one section of the grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule entries in file order
    pub rules: Vec<Rule>,
    /// Parsed uniformity flags
    #[serde(default)]
    pub uniformity: Uniformity,
}

impl RuleSet {
    /// First rule whose attribute tag contains `tag`
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.attr.contains(tag))
    }

    /// First rule of the set, if any
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&Rule> {
        self.rules.first()
    }
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(v) => v.to_string(),
        Raw::Float(v) => v.to_string(),
        Raw::Text(v) => v,
    })
}

struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(mut self) -> SceneResult<Uniformity> {
        let mut map = BTreeMap::new();
        self.expect('{')?;
        self.skip_ws();
        if self.eat('}') {
            return self.finish(map);
        }
        loop {
            let key = self.string()?;
            self.expect(':')?;
            let value = self.boolean()?;
            map.insert(key, value);
            self.skip_ws();
            if self.eat(',') {
                self.skip_ws();
                // trailing comma
                if self.eat('}') {
                    return self.finish(map);
                }
                continue;
            }
            self.expect('}')?;
            return self.finish(map);
        }
    }

    fn finish(mut self, map: BTreeMap<String, bool>) -> SceneResult<Uniformity> {
        self.skip_ws();
        if self.pos != self.input.len() {
            return Err(SceneError::uniformity(self.pos, "trailing characters"));
        }
        Ok(Uniformity(map))
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> SceneResult<()> {
        self.skip_ws();
        if self.eat(c) {
            Ok(())
        } else {
            Err(SceneError::uniformity(self.pos, format!("expected '{c}'")))
        }
    }

    fn string(&mut self) -> SceneResult<String> {
        self.skip_ws();
        let quote = match self.rest().chars().next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(SceneError::uniformity(self.pos, "expected quoted key")),
        };
        let start = self.pos + 1;
        let Some(len) = self.input[start..].find(quote) else {
            return Err(SceneError::uniformity(self.pos, "unterminated string"));
        };
        self.pos = start + len + 1;
        Ok(self.input[start..start + len].to_string())
    }

    fn boolean(&mut self) -> SceneResult<bool> {
        self.skip_ws();
        for (word, value) in [("True", true), ("False", false)] {
            if self.rest().starts_with(word) {
                self.pos += word.len();
                return Ok(value);
            }
        }
        Err(SceneError::uniformity(self.pos, "expected True or False"))
    }
}
