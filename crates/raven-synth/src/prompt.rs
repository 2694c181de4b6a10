//! Final puzzle question

use crate::layout::Configuration;
use crate::question::ChainQuestion;
use raven_scene::ChoiceValue;
use std::path::Path;

const PROMPT_HEAD: &str = "You are presented with a 3x3 grid of panels, called the 'Problem Matrix.' \
     The last panel is missing and marked with a '?' symbol. ";
const PROMPT_TAIL: &str = "Below the matrix, there is a set of 8 possible answer options labeled from 1 to 8. \
     Your task is to determine which panel from the answer set (1-8) correctly fits the missing position in the problem matrix. \
     The pattern in the matrix follows some hidden rules that apply row by row (horizontally). \
     Please select the number (from 1 to 8) of the panel that completes the pattern.";

/// Stage label of the final question
pub const FINAL_STAGE: &str = "final";

/// File name of the full puzzle image next to the panel crops
pub const COMBINED_IMAGE: &str = "combined.png";

/// Puzzle prompt with the layout sentence of `config`
#[must_use]
pub fn puzzle_prompt(config: Configuration) -> String {
    [PROMPT_HEAD, config.layout_sentence(), PROMPT_TAIL].concat()
}

/// Final question answered by the archive's target index
///
/// The image is `combined.png` in the directory of `first_image`.
#[must_use]
pub fn final_question(config: Configuration, target: i64, first_image: &Path) -> ChainQuestion {
    let image = first_image
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(COMBINED_IMAGE);
    ChainQuestion {
        question: puzzle_prompt(config),
        choices: None,
        correct_answer: ChoiceValue::Integer(target),
        config: config.name().to_string(),
        image_path: image.display().to_string(),
        stage: FINAL_STAGE.to_string(),
        attribute: None,
    }
}
