//! Puzzle configurations and their panel sections
//!
//! Each configuration name maps to a panel layout. Split layouts ask
//! every question once per section, scoped by a positional partition
//! node, and search row templates by the section's keywords.

use crate::error::SynthError;
use raven_engine::Region;
use std::fmt;
use std::str::FromStr;

/// One region of a panel that questions are scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Partition applied to panel objects; `None` keeps the whole panel
    pub region: Option<Region>,
    /// Word used in "the {name} part of the panel"
    pub name: &'static str,
    /// Stage label suffix
    pub suffix: &'static str,
    /// Any of these in a template question marks it as about this section
    pub keywords: &'static [&'static str],
}

impl Section {
    /// The whole panel
    pub const WHOLE: Section = Section {
        region: None,
        name: "",
        suffix: "",
        keywords: &[],
    };

    const LEFT: Section = Section {
        region: Some(Region::Left),
        name: "left",
        suffix: "left",
        keywords: &["the left"],
    };

    const RIGHT: Section = Section {
        region: Some(Region::Right),
        name: "right",
        suffix: "right",
        keywords: &["the right"],
    };

    const TOP: Section = Section {
        region: Some(Region::Top),
        name: "top",
        suffix: "top",
        keywords: &["the top"],
    };

    const BOTTOM: Section = Section {
        region: Some(Region::Bottom),
        name: "bottom",
        suffix: "bottom",
        keywords: &["the bottom"],
    };

    const INNER: Section = Section {
        region: Some(Region::Inner),
        name: "inner",
        suffix: "in",
        keywords: &["inner", "interior"],
    };

    const OUTER: Section = Section {
        region: Some(Region::Outer),
        name: "outer",
        suffix: "out",
        keywords: &["the outer"],
    };

    /// Whether this is the whole panel
    #[inline]
    #[must_use]
    pub fn is_whole(&self) -> bool {
        self.region.is_none()
    }

    /// Short name for messages
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_whole() {
            "whole panel"
        } else {
            self.name
        }
    }

    /// `"the panel"` or `"the left part of the panel"`
    #[must_use]
    pub fn phrase(&self) -> String {
        if self.is_whole() {
            "the panel".to_string()
        } else {
            format!("the {} part of the panel", self.name)
        }
    }

    /// Stage label with this section's suffix, if any
    #[must_use]
    pub fn stage(&self, base: &str) -> String {
        if self.suffix.is_empty() {
            base.to_string()
        } else {
            format!("{base}_{}", self.suffix)
        }
    }

    /// Whether a template question text is about this section
    #[must_use]
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.keywords.is_empty() || self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Puzzle configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Configuration {
    /// One centered object
    CenterSingle,
    /// 2x2 grid
    DistributeFour,
    /// 3x3 grid
    DistributeNine,
    /// Left and right halves
    LeftRight,
    /// Top and bottom halves
    UpDown,
    /// Outer frame around one inner object
    InCenter,
    /// Outer frame around a 2x2 inner grid
    InDistributeFour,
}

impl Configuration {
    /// Every supported configuration
    pub const ALL: [Configuration; 7] = [
        Configuration::CenterSingle,
        Configuration::DistributeFour,
        Configuration::DistributeNine,
        Configuration::LeftRight,
        Configuration::UpDown,
        Configuration::InCenter,
        Configuration::InDistributeFour,
    ];

    /// Directory and `config` field name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Configuration::CenterSingle => "center_single",
            Configuration::DistributeFour => "distribute_four",
            Configuration::DistributeNine => "distribute_nine",
            Configuration::LeftRight => "left_center_single_right_center_single",
            Configuration::UpDown => "up_center_single_down_center_single",
            Configuration::InCenter => "in_center_single_out_center_single",
            Configuration::InDistributeFour => "in_distribute_four_out_center_single",
        }
    }

    /// Sections in question order
    #[must_use]
    pub fn sections(self) -> &'static [Section] {
        match self {
            Configuration::CenterSingle | Configuration::DistributeFour | Configuration::DistributeNine => {
                &[Section::WHOLE]
            }
            Configuration::LeftRight => &[Section::LEFT, Section::RIGHT],
            Configuration::UpDown => &[Section::TOP, Section::BOTTOM],
            Configuration::InCenter | Configuration::InDistributeFour => &[Section::INNER, Section::OUTER],
        }
    }

    /// Labels a position answer may take
    #[must_use]
    pub fn position_space(self) -> &'static [&'static str] {
        match self {
            Configuration::CenterSingle => &["center", "top-left", "top-right", "bottom-left", "bottom-right"],
            Configuration::DistributeFour => &["top-left", "top-right", "bottom-left", "bottom-right"],
            Configuration::DistributeNine => &[
                "top-left",
                "top-center",
                "top-right",
                "middle-left",
                "middle-center",
                "middle-right",
                "bottom-left",
                "bottom-center",
                "bottom-right",
            ],
            Configuration::LeftRight => &["left", "right"],
            Configuration::UpDown => &["top", "bottom"],
            Configuration::InCenter => &["outer-part", "inner-part"],
            Configuration::InDistributeFour => &[
                "outer-part",
                "top-left of the inner part",
                "top-right of the inner part",
                "bottom-left of the inner part",
                "bottom-right of the inner part",
            ],
        }
    }

    /// Number of choices offered for a position question
    #[must_use]
    pub fn position_choice_count(self) -> usize {
        match self {
            Configuration::LeftRight | Configuration::UpDown | Configuration::InCenter => 2,
            _ => 4,
        }
    }

    /// Layout sentence of the final puzzle prompt
    #[must_use]
    pub fn layout_sentence(self) -> &'static str {
        match self {
            Configuration::InCenter | Configuration::InDistributeFour => {
                "Each panel is divided into two regions: an outer structure and an inner structure, with rules applied separately to each section. "
            }
            Configuration::LeftRight => {
                "Each panel divided into two sections by a vertical line, separating the left side from the right side, with rules applied separately to each section. "
            }
            Configuration::UpDown => {
                "Each panel is split by a horizontal line, separating the top side from the bottom side, with rules applied separately to each section. "
            }
            _ => "",
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Configuration {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Configuration::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| SynthError::UnknownConfig(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for config in Configuration::ALL {
            assert_eq!(config.name().parse::<Configuration>().unwrap(), config);
        }
        assert!(matches!(
            "center_double".parse::<Configuration>(),
            Err(SynthError::UnknownConfig(name)) if name == "center_double"
        ));
    }

    #[test]
    fn split_layouts_have_two_sections() {
        assert_eq!(Configuration::DistributeNine.sections(), &[Section::WHOLE]);
        let suffixes: Vec<&str> = Configuration::InDistributeFour.sections().iter().map(|s| s.suffix).collect();
        assert_eq!(suffixes, vec!["in", "out"]);
    }

    #[test]
    fn section_text() {
        let left = Configuration::LeftRight.sections()[0];
        assert_eq!(left.phrase(), "the left part of the panel");
        assert_eq!(left.stage("one_row"), "one_row_left");
        assert_eq!(Section::WHOLE.stage("two_rows"), "two_rows");
        assert!(Section::INNER.mentioned_in("the interior shapes"));
        assert!(!Section::OUTER.mentioned_in("the inner shapes"));
        assert!(Section::WHOLE.mentioned_in("anything"));
    }

    #[test]
    fn position_spaces_cover_choice_counts() {
        for config in Configuration::ALL {
            assert!(config.position_space().len() >= config.position_choice_count());
        }
    }
}
