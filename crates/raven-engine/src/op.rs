//! Closed set of operation kinds
//!
//! Every node names one of these operations. Parsing a name outside the
//! set is a [`ProgramError::UnknownOperation`]; there is no runtime
//! handler lookup to miss.

use crate::error::ProgramError;
use raven_scene::Attribute;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Named sub-area of a panel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Position exactly `left`
    Left,
    /// Position exactly `right`
    Right,
    /// Position exactly `top`
    Top,
    /// Position exactly `bottom`
    Bottom,
    /// Position containing `inner`
    Inner,
    /// Position containing `outer`
    Outer,
}

impl Region {
    /// Whether a position label falls inside this region
    #[must_use]
    pub fn contains(self, position: &str) -> bool {
        match self {
            Region::Left => position == "left",
            Region::Right => position == "right",
            Region::Top => position == "top",
            Region::Bottom => position == "bottom",
            Region::Inner => position.contains("inner"),
            Region::Outer => position.contains("outer"),
        }
    }
}

/// Equality operation flavours; all share one handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EqualKind {
    /// `equal_color`
    Color,
    /// `equal_shape`
    Shape,
    /// `equal_integer`
    Integer,
    /// `equal_size`
    Size,
    /// `equal_object`
    Object,
}

/// Attributes covered by the consistency checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelAttr {
    /// Shape
    Shape,
    /// Color level
    Color,
    /// Size level
    Size,
    /// Position label
    Position,
}

/// Attributes described by rule records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleAttr {
    /// Object count
    Number,
    /// Object layout
    Position,
    /// Shape, tagged `Type` in rule records
    Shape,
    /// Size
    Size,
    /// Color
    Color,
}

impl RuleAttr {
    /// Tag searched for in a rule's `attr` field
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            RuleAttr::Number => "Number",
            RuleAttr::Position => "Position",
            RuleAttr::Shape => "Type",
            RuleAttr::Size => "Size",
            RuleAttr::Color => "Color",
        }
    }
}

/// Operation kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    /// All panels of the scene
    Scene,
    /// One panel selected by index
    QueryPanel,
    /// Keep objects whose attribute matches a literal
    Filter(Attribute),
    /// Keep objects inside a layout region
    Region(Region),
    /// The single element of a collection
    Unique,
    /// Table relation lookup
    Relate,
    /// Edge-list relation scan
    VgRelate,
    /// Sorted set union
    Union,
    /// Sorted set intersection
    Intersect,
    /// Collection size
    Count,
    /// Collection non-empty
    Exist,
    /// Value equality
    Equal(EqualKind),
    /// Numeric `<`
    LessThan,
    /// Numeric `>`
    GreaterThan,
    /// Extract one attribute
    Query(Attribute),
    /// Other objects sharing an attribute
    Same(Attribute),
    /// Same / Smaller / Larger
    CompareSize,
    /// Same / Darker / Brighter
    CompareColor,
    /// Same / Fewer / More edges
    CompareShape,
    /// Same / Fewer / More objects
    CompareNumber,
    /// Direction between two position labels
    ComparePosition,
    /// All objects of one collection agree on an attribute
    AllEqual(PanelAttr),
    /// Compare the shared attribute of two collections
    TwoPanel(PanelAttr),
    /// Describe the generative rule of an attribute
    QueryRule(RuleAttr),
}

const FILTER_ATTRS: [Attribute; 5] = [
    Attribute::Color,
    Attribute::Shape,
    Attribute::Position,
    Attribute::Size,
    Attribute::Category,
];

impl OpKind {
    /// Every operation kind, in registry order
    #[must_use]
    pub fn all() -> Vec<OpKind> {
        let mut kinds = vec![OpKind::Scene, OpKind::QueryPanel];
        kinds.extend(FILTER_ATTRS.map(OpKind::Filter));
        kinds.extend(
            [
                Region::Left,
                Region::Right,
                Region::Top,
                Region::Bottom,
                Region::Inner,
                Region::Outer,
            ]
            .map(OpKind::Region),
        );
        kinds.extend([
            OpKind::Unique,
            OpKind::Relate,
            OpKind::VgRelate,
            OpKind::Union,
            OpKind::Intersect,
            OpKind::Count,
            OpKind::Exist,
        ]);
        kinds.extend(
            [
                EqualKind::Color,
                EqualKind::Shape,
                EqualKind::Integer,
                EqualKind::Size,
                EqualKind::Object,
            ]
            .map(OpKind::Equal),
        );
        kinds.extend([OpKind::LessThan, OpKind::GreaterThan]);
        kinds.extend(FILTER_ATTRS.map(OpKind::Query));
        kinds.extend(FILTER_ATTRS.map(OpKind::Same));
        kinds.extend([
            OpKind::CompareSize,
            OpKind::CompareColor,
            OpKind::CompareShape,
            OpKind::CompareNumber,
            OpKind::ComparePosition,
        ]);
        let panel_attrs = [
            PanelAttr::Shape,
            PanelAttr::Color,
            PanelAttr::Size,
            PanelAttr::Position,
        ];
        kinds.extend(panel_attrs.map(OpKind::AllEqual));
        kinds.extend(panel_attrs.map(OpKind::TwoPanel));
        kinds.extend(
            [
                RuleAttr::Number,
                RuleAttr::Position,
                RuleAttr::Shape,
                RuleAttr::Size,
                RuleAttr::Color,
            ]
            .map(OpKind::QueryRule),
        );
        kinds
    }

    /// Operation name as written in programs
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Scene => "scene",
            OpKind::QueryPanel => "query_panel",
            OpKind::Filter(Attribute::Color) => "filter_color",
            OpKind::Filter(Attribute::Shape) => "filter_shape",
            OpKind::Filter(Attribute::Size) => "filter_size",
            OpKind::Filter(Attribute::Position) => "filter_position",
            OpKind::Filter(Attribute::Category) => "filter_objectcategory",
            OpKind::Region(Region::Left) => "left_position_handler",
            OpKind::Region(Region::Right) => "right_position_handler",
            OpKind::Region(Region::Top) => "top_position_handler",
            OpKind::Region(Region::Bottom) => "down_position_handler",
            OpKind::Region(Region::Inner) => "inner_position_handler",
            OpKind::Region(Region::Outer) => "outer_position_handler",
            OpKind::Unique => "unique",
            OpKind::Relate => "relate",
            OpKind::VgRelate => "vg_relate_handler",
            OpKind::Union => "union",
            OpKind::Intersect => "intersect",
            OpKind::Count => "count",
            OpKind::Exist => "exist",
            OpKind::Equal(EqualKind::Color) => "equal_color",
            OpKind::Equal(EqualKind::Shape) => "equal_shape",
            OpKind::Equal(EqualKind::Integer) => "equal_integer",
            OpKind::Equal(EqualKind::Size) => "equal_size",
            OpKind::Equal(EqualKind::Object) => "equal_object",
            OpKind::LessThan => "less_than",
            OpKind::GreaterThan => "greater_than",
            OpKind::Query(Attribute::Color) => "query_color",
            OpKind::Query(Attribute::Shape) => "query_shape",
            OpKind::Query(Attribute::Size) => "query_size",
            OpKind::Query(Attribute::Position) => "query_position",
            OpKind::Query(Attribute::Category) => "query_objectcategory",
            OpKind::Same(Attribute::Color) => "same_color",
            OpKind::Same(Attribute::Shape) => "same_shape",
            OpKind::Same(Attribute::Size) => "same_size",
            OpKind::Same(Attribute::Position) => "same_position",
            OpKind::Same(Attribute::Category) => "same_objectcategory",
            OpKind::CompareSize => "compare_size",
            OpKind::CompareColor => "compare_color",
            OpKind::CompareShape => "compare_shape",
            OpKind::CompareNumber => "compare_number",
            OpKind::ComparePosition => "compare_position",
            OpKind::AllEqual(PanelAttr::Color) => "all_color_equal_comparison",
            OpKind::AllEqual(PanelAttr::Shape) => "all_shape_equal_comparison",
            OpKind::AllEqual(PanelAttr::Size) => "all_size_equal_comparison",
            OpKind::AllEqual(PanelAttr::Position) => "all_position_equal_comparison",
            OpKind::TwoPanel(PanelAttr::Shape) => "two_panel_shape_equal_comparison",
            OpKind::TwoPanel(PanelAttr::Color) => "two_panel_color_equal_comparison",
            OpKind::TwoPanel(PanelAttr::Size) => "two_panel_size_equal_comparison",
            OpKind::TwoPanel(PanelAttr::Position) => "two_panel_position_equal_comparison",
            OpKind::QueryRule(RuleAttr::Number) => "query_number_rule",
            OpKind::QueryRule(RuleAttr::Position) => "query_position_rule",
            OpKind::QueryRule(RuleAttr::Shape) => "query_shape_rule",
            OpKind::QueryRule(RuleAttr::Size) => "query_size_rule",
            OpKind::QueryRule(RuleAttr::Color) => "query_color_rule",
        }
    }

    /// Accepted number of inputs
    #[must_use]
    pub fn input_arity(self) -> RangeInclusive<usize> {
        match self {
            OpKind::Scene => 0..=0,
            OpKind::QueryRule(_) => 0..=1,
            OpKind::Union
            | OpKind::Intersect
            | OpKind::Equal(_)
            | OpKind::LessThan
            | OpKind::GreaterThan
            | OpKind::CompareSize
            | OpKind::CompareColor
            | OpKind::CompareShape
            | OpKind::CompareNumber
            | OpKind::ComparePosition
            | OpKind::TwoPanel(_) => 2..=2,
            _ => 1..=1,
        }
    }

    /// Required number of side inputs
    #[must_use]
    pub fn side_input_arity(self) -> usize {
        match self {
            OpKind::QueryPanel
            | OpKind::Filter(_)
            | OpKind::Relate
            | OpKind::VgRelate
            | OpKind::QueryRule(_) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpKind {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpKind::all()
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ProgramError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_parse_back() {
        let kinds = OpKind::all();
        let names: HashSet<_> = kinds.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), kinds.len());
        for kind in kinds {
            assert_eq!(kind.name().parse::<OpKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["equal_material", "same_material", "filter_angle", ""] {
            assert_eq!(
                name.parse::<OpKind>(),
                Err(ProgramError::UnknownOperation(name.to_string()))
            );
        }
    }

    #[test]
    fn region_membership() {
        assert!(Region::Left.contains("left"));
        assert!(!Region::Left.contains("top-left"));
        assert!(Region::Bottom.contains("bottom"));
        assert!(Region::Inner.contains("bottom-right of the inner part"));
        assert!(Region::Inner.contains("inner-part"));
        assert!(Region::Outer.contains("outer-part"));
        assert!(!Region::Outer.contains("inner-part"));
    }

    #[test]
    fn arity_table() {
        assert_eq!(OpKind::Scene.input_arity(), 0..=0);
        assert_eq!(OpKind::Union.input_arity(), 2..=2);
        assert_eq!(OpKind::QueryRule(RuleAttr::Number).input_arity(), 0..=1);
        assert_eq!(OpKind::Filter(Attribute::Color).side_input_arity(), 1);
        assert_eq!(OpKind::Count.side_input_arity(), 0);
    }
}
