//! Output records

use raven_scene::ChoiceValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute a chain of questions is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionAttr {
    /// Object count
    Number,
    /// Object placement
    Position,
    /// Object shape
    Shape,
    /// Object color
    Color,
    /// Object size
    Size,
}

impl QuestionAttr {
    /// Attributes in chain order
    pub const ALL: [QuestionAttr; 5] = [
        QuestionAttr::Number,
        QuestionAttr::Position,
        QuestionAttr::Shape,
        QuestionAttr::Color,
        QuestionAttr::Size,
    ];

    /// Lowercase name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            QuestionAttr::Number => "number",
            QuestionAttr::Position => "position",
            QuestionAttr::Shape => "shape",
            QuestionAttr::Color => "color",
            QuestionAttr::Size => "size",
        }
    }
}

impl fmt::Display for QuestionAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One question of a logical chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainQuestion {
    /// Question text
    pub question: String,
    /// Answer choices; absent on the final puzzle question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ChoiceValue>>,
    /// Correct answer (a letter once choices are lettered)
    pub correct_answer: ChoiceValue,
    /// Configuration name
    pub config: String,
    /// Image the question refers to
    pub image_path: String,
    /// Stage label, e.g. `single_panel_2_left`
    pub stage: String,
    /// Attribute; absent on the final puzzle question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<QuestionAttr>,
}

/// All questions generated for one scene document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInstance {
    /// Source document path
    pub file_path: String,
    /// Questions in chain order, final question last
    pub questions: Vec<ChainQuestion>,
    /// Original archive file name of the puzzle
    pub original_filename: String,
}
