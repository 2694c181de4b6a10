//! Question programs
//!
//! A [`Program`] is an ordered list of [`Node`]s where every input points
//! to a strictly earlier node, so index order is a valid evaluation order.
//!
//! # Critical Invariant
//!
//! All structural checks (operation names, arities, backward references)
//! happen in [`Program::new`]. The evaluator trusts a constructed program
//! and performs no structural validation of its own.

use crate::error::ProgramError;
use crate::op::OpKind;
use raven_scene::Level;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constant parameter of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SideInput {
    /// Text literal
    Text(String),
    /// Numeric literal
    Number(Level),
}

impl SideInput {
    /// Text literal
    pub fn text(text: impl Into<String>) -> Self {
        SideInput::Text(text.into())
    }

    /// Numeric literal
    pub fn number(value: impl Into<Level>) -> Self {
        SideInput::Number(value.into())
    }
}

impl fmt::Display for SideInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideInput::Text(text) => f.write_str(text),
            SideInput::Number(level) => write!(f, "{level}"),
        }
    }
}

/// One operation node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Operation kind
    #[serde(rename = "type", with = "op_name")]
    pub kind: OpKind,
    /// Indices of earlier nodes feeding this one
    #[serde(default)]
    pub inputs: Vec<usize>,
    /// Constant parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub side_inputs: Vec<SideInput>,
}

impl Node {
    /// Node without side inputs
    #[must_use]
    pub fn new(kind: OpKind, inputs: Vec<usize>) -> Self {
        Self {
            kind,
            inputs,
            side_inputs: Vec::new(),
        }
    }

    /// Source node returning every panel
    #[must_use]
    pub fn scene() -> Self {
        Self::new(OpKind::Scene, Vec::new())
    }

    /// Add a side input
    #[must_use]
    pub fn with_side_input(mut self, side_input: SideInput) -> Self {
        self.side_inputs.push(side_input);
        self
    }

    /// Short label, e.g. `filter_color[3]`
    #[must_use]
    pub fn label(&self) -> String {
        match self.side_inputs.first() {
            Some(side) => format!("{}[{side}]", self.kind),
            None => self.kind.to_string(),
        }
    }
}

/// Validated node DAG
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawProgram")]
pub struct Program {
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct RawProgram {
    nodes: Vec<Node>,
}

impl TryFrom<RawProgram> for Program {
    type Error = ProgramError;

    fn try_from(raw: RawProgram) -> Result<Self, Self::Error> {
        Program::new(raw.nodes)
    }
}

impl Program {
    /// Validate and wrap a node list
    ///
    /// # Errors
    ///
    /// - [`ProgramError::Empty`] for an empty list
    /// - [`ProgramError::ForwardReference`] when an input is not strictly earlier
    /// - [`ProgramError::InputArity`] / [`ProgramError::SideInputArity`] on
    ///   arity mismatches
    pub fn new(nodes: Vec<Node>) -> Result<Self, ProgramError> {
        if nodes.is_empty() {
            return Err(ProgramError::Empty);
        }
        for (index, node) in nodes.iter().enumerate() {
            if let Some(&input) = node.inputs.iter().find(|&&input| input >= index) {
                return Err(ProgramError::ForwardReference { node: index, input });
            }
            let inputs = node.kind.input_arity();
            if !inputs.contains(&node.inputs.len()) {
                let expected = if inputs.start() == inputs.end() {
                    inputs.start().to_string()
                } else {
                    format!("{}..={}", inputs.start(), inputs.end())
                };
                return Err(ProgramError::InputArity {
                    node: index,
                    op: node.kind.name(),
                    expected,
                    actual: node.inputs.len(),
                });
            }
            let side = node.kind.side_input_arity();
            if node.side_inputs.len() != side {
                return Err(ProgramError::SideInputArity {
                    node: index,
                    op: node.kind.name(),
                    expected: side,
                    actual: node.side_inputs.len(),
                });
            }
        }
        Ok(Self { nodes })
    }

    /// Parse a program from `{"nodes": [...]}` JSON
    ///
    /// # Errors
    ///
    /// Returns the decode error, which wraps any [`ProgramError`].
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Nodes in evaluation order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a constructed program
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the sink node
    #[inline]
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.nodes.len() - 1
    }
}

/// Fluent program construction for code-built questions
///
/// Each `push` returns the index of the new node so later nodes can
/// reference it.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    nodes: Vec<Node>,
}

impl ProgramBuilder {
    /// Empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, returning its index
    pub fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Append a node without side inputs
    pub fn op(&mut self, kind: OpKind, inputs: &[usize]) -> usize {
        self.push(Node::new(kind, inputs.to_vec()))
    }

    /// Append a node with one side input
    pub fn op_with(&mut self, kind: OpKind, inputs: &[usize], side_input: SideInput) -> usize {
        self.push(Node::new(kind, inputs.to_vec()).with_side_input(side_input))
    }

    /// Validate into a program
    ///
    /// # Errors
    ///
    /// Same as [`Program::new`].
    pub fn build(self) -> Result<Program, ProgramError> {
        Program::new(self.nodes)
    }
}

mod op_name {
    use crate::op::OpKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(kind: &OpKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(kind.name())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OpKind, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::RuleAttr;
    use raven_scene::Attribute;

    #[test]
    fn parses_program_json() {
        let program = Program::from_json(
            r#"{"nodes": [
                {"type": "scene", "inputs": []},
                {"type": "query_panel", "inputs": [0], "side_inputs": [1]},
                {"type": "filter_shape", "inputs": [1], "side_inputs": ["circle"]},
                {"type": "count", "inputs": [2]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.nodes()[2].kind, OpKind::Filter(Attribute::Shape));
        assert_eq!(program.nodes()[1].side_inputs, vec![SideInput::number(1_i64)]);
        assert_eq!(program.nodes()[2].label(), "filter_shape[circle]");
        assert_eq!(program.last_index(), 3);
    }

    #[test]
    fn unknown_operation_is_fatal() {
        let err = Program::from_json(r#"{"nodes": [{"type": "equal_material", "inputs": []}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown operation: 'equal_material'"));
    }

    #[test]
    fn rejects_forward_and_self_references() {
        let err = Program::new(vec![Node::scene(), Node::new(OpKind::Count, vec![1])]).unwrap_err();
        assert_eq!(err, ProgramError::ForwardReference { node: 1, input: 1 });

        let err = Program::new(vec![Node::new(OpKind::Count, vec![3])]).unwrap_err();
        assert_eq!(err, ProgramError::ForwardReference { node: 0, input: 3 });
    }

    #[test]
    fn rejects_arity_mismatches() {
        let err = Program::new(vec![Node::scene(), Node::new(OpKind::Union, vec![0])]).unwrap_err();
        assert!(matches!(err, ProgramError::InputArity { node: 1, actual: 1, .. }));

        let err = Program::new(vec![
            Node::scene(),
            Node::new(OpKind::Filter(Attribute::Color), vec![0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ProgramError::SideInputArity { node: 1, expected: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn rule_queries_accept_zero_or_one_input() {
        let rule = |inputs| {
            Node::new(OpKind::QueryRule(RuleAttr::Color), inputs).with_side_input(SideInput::text("Normal"))
        };
        assert!(Program::new(vec![rule(vec![])]).is_ok());
        assert!(Program::new(vec![Node::scene(), rule(vec![0])]).is_ok());
        assert!(Program::new(vec![Node::scene(), Node::scene(), rule(vec![0, 1])]).is_err());
    }

    #[test]
    fn rejects_empty_program() {
        assert_eq!(Program::new(Vec::new()), Err(ProgramError::Empty));
    }

    #[test]
    fn builder_returns_indices() {
        let mut builder = ProgramBuilder::new();
        let scene = builder.op(OpKind::Scene, &[]);
        let panel = builder.op_with(OpKind::QueryPanel, &[scene], SideInput::number(0_i64));
        let count = builder.op(OpKind::Count, &[panel]);
        assert_eq!((scene, panel, count), (0, 1, 2));
        assert_eq!(builder.build().unwrap().len(), 3);
    }
}
