//! Choice lettering
//!
//! Generated choices are plain values; the output format wants `A: ...`
//! labels and the correct answer as its letter. Template choices arrive
//! already lettered and are left untouched.

use crate::question::ChainQuestion;
use raven_scene::ChoiceValue;

const LETTERED: [&str; 4] = ["A:", "B:", "C:", "D:"];

/// Canonical spelling of a generated answer
#[must_use]
pub fn normalize_answer(answer: &str) -> &str {
    match answer {
        "Same" => "The same",
        "Not Comparable" => "Not comparable",
        other => other,
    }
}

fn is_lettered(choices: &[ChoiceValue]) -> bool {
    choices
        .iter()
        .any(|c| matches!(c, ChoiceValue::Text(t) if LETTERED.iter().any(|p| t.starts_with(p))))
}

/// Letter the choices of one question in place
///
/// Questions without choices are skipped.
pub fn letter_choices(question: &mut ChainQuestion) {
    let Some(choices) = question.choices.as_mut() else {
        return;
    };
    if is_lettered(choices) {
        return;
    }
    let answer = question.correct_answer.as_text();
    let answer = normalize_answer(&answer).to_string();

    let mut letter = None;
    let lettered = ('A'..='Z')
        .zip(choices.iter())
        .map(|(l, choice)| {
            let text = choice.as_text();
            if letter.is_none() && text == answer {
                letter = Some(l);
            }
            ChoiceValue::Text(format!("{l}: {text}"))
        })
        .collect();
    *choices = lettered;
    if let Some(l) = letter {
        question.correct_answer = ChoiceValue::Text(l.to_string());
    }
}
