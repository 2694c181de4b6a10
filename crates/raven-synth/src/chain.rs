//! Logical chain of one scene document
//!
//! For every attribute the chain walks from single panels to panel pairs
//! to whole rows:
//!
//! | Stage | Source of the answer |
//! |-------|----------------------|
//! | `single_panel_{n}` | engine program over panel `n` |
//! | `two_panels_{n}_{n+1}` | engine comparison of two panels |
//! | `one_row`, `two_rows` | pre-rendered template question |
//!
//! Split layouts repeat each stage once per [`Section`], scoping the
//! panel objects with the section's partition node.

use crate::error::{SynthError, SynthResult};
use crate::layout::{Configuration, Section};
use crate::question::{ChainQuestion, QuestionAttr};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use raven_engine::{Entity, ExecutionContext, OpKind, Outcome, PanelAttr, ProgramBuilder, Region, SideInput, Value};
use raven_scene::{ChoiceValue, SceneDocument, Shape, TemplateQuestion};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SINGLE_PANELS: usize = 3;
const PANEL_PAIRS: usize = 2;
const NUMBER_TEMPLATE_MARK: &str = "The number of objects";
const ONLY_ONE_OBJECT: &str = "Only one object";

const TWO_PANEL_NUMBER: &str =
    "Does the left panel contain the same number of objects, more objects, or fewer objects than the right panel?";
const TWO_PANEL_POSITION: &str =
    "Is the position of all the objects in the left panel the same as the objects in the right panel?";
const TWO_PANEL_SHAPE: &str = "Is the shape of all the objects in the left panel have the same, more, or fewer edges \
     compared to the objects in the right panel? \
     If the shapes within either panel are already different from each other, select 'Not Comparable.' \
     (Note: The edge number increases in the following order: triangle, square, pentagon, hexagon, circle)";
const TWO_PANEL_SIZE: &str = "Is the size of all the objects in the left panel the same as, smaller \
     or larger than the objects in the right panel? \
     If the sizes within either panel are already different from each other, select 'Not Comparable.";
const TWO_PANEL_COLOR: &str = "Is the color of all the objects in the left panel the same as, \
     darker or brighter than the objects in the right panel? \
     If the colors within either panel are already different from each other, select 'Not Comparable.'";

/// Row stages answered from templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowStage {
    OneRow,
    TwoRows,
}

impl RowStage {
    fn base(self) -> &'static str {
        match self {
            RowStage::OneRow => "one_row",
            RowStage::TwoRows => "two_rows",
        }
    }

    /// Substring of the template file name
    fn marker(self) -> &'static str {
        match self {
            RowStage::OneRow => "reasoning_first",
            RowStage::TwoRows => "reasoning_second",
        }
    }
}

/// Derive the chain questions of a document
///
/// `template` supplies the configuration name and image location; it is
/// normally the document's first template question. Questions whose
/// section is empty or whose row template is absent are skipped with a
/// warning.
///
/// # Errors
///
/// [`SynthError::UnknownConfig`] for an unsupported configuration,
/// [`SynthError::Engine`] if a derivation program fails, and
/// [`SynthError::MissingPanel`] for documents with fewer than three panels.
pub fn derive_chain(
    document: &SceneDocument,
    template: &TemplateQuestion,
    dataset_root: &Path,
    rng: &mut StdRng,
) -> SynthResult<Vec<ChainQuestion>> {
    let config: Configuration = template.config.parse()?;
    let scene = document.scene();
    let image = dataset_root.join(&template.config).join(&template.image_filename);
    let mut deriver = Deriver {
        document,
        config,
        ctx: ExecutionContext::new(&scene),
        panel_dir: image.parent().map(Path::to_path_buf).unwrap_or_default(),
        dataset_root,
    };

    let mut questions = Vec::new();
    for attribute in QuestionAttr::ALL {
        for panel in 0..SINGLE_PANELS {
            for section in config.sections() {
                keep(deriver.single_panel(attribute, panel, section, rng), &mut questions)?;
            }
        }
        for panel in 0..PANEL_PAIRS {
            for section in config.sections() {
                keep(deriver.two_panels(attribute, panel, section, rng), &mut questions)?;
            }
        }
        for row in [RowStage::OneRow, RowStage::TwoRows] {
            for section in config.sections() {
                keep(deriver.row(attribute, row, section), &mut questions)?;
            }
        }
    }
    let stats = deriver.ctx.stats();
    debug!(
        config = %config,
        questions = questions.len(),
        handlers = stats.handlers_invoked,
        cache_hits = stats.cache_hits,
        "derived chain"
    );
    Ok(questions)
}

fn keep(result: SynthResult<ChainQuestion>, questions: &mut Vec<ChainQuestion>) -> SynthResult<()> {
    match result {
        Ok(question) => questions.push(question),
        Err(e) if e.is_skippable() => warn!(error = %e, "skipping question"),
        Err(e) => return Err(e),
    }
    Ok(())
}

struct Deriver<'d, 's> {
    document: &'d SceneDocument,
    config: Configuration,
    ctx: ExecutionContext<'s>,
    panel_dir: PathBuf,
    dataset_root: &'d Path,
}

impl Deriver<'_, '_> {
    fn single_panel(
        &mut self,
        attribute: QuestionAttr,
        panel: usize,
        section: &Section,
        rng: &mut StdRng,
    ) -> SynthResult<ChainQuestion> {
        let stage = section.stage(&format!("single_panel_{}", panel + 1));
        self.check_panel(panel)?;
        let phrase = section.phrase();

        let (question, mut choices, answer) = match attribute {
            QuestionAttr::Number => {
                let mut b = ProgramBuilder::new();
                let objects = push_section(&mut b, panel, section);
                b.op(OpKind::Count, &[objects]);
                let count = match self.evaluate(b)? {
                    Outcome::Value(Value::Integer(n)) => n,
                    other => return Err(unexpected(&stage, &other)),
                };
                let choices = number_distractors(count, rng);
                (format!("How many objects are in {phrase}?"), choices, ChoiceValue::Integer(count))
            }
            QuestionAttr::Position => {
                let entity = self.pick_object(panel, section, &stage, rng)?;
                let answer = entity.object.position.clone();
                let choices = self.position_choices(&answer, rng);
                let question = format!("Where is the {} positioned in {phrase}?", entity.object.shape);
                (question, choices, ChoiceValue::Text(answer))
            }
            QuestionAttr::Shape => {
                let entity = self.pick_object(panel, section, &stage, rng)?;
                let position = &entity.object.position;
                let question = match section.region {
                    None => format!("What is the shape of the object at {position} in the panel?"),
                    Some(Region::Inner) => {
                        format!("What is the shape of the object in the {position} of the panel?")
                    }
                    Some(_) => format!("What is the shape of the object in {phrase}?"),
                };
                let answer = entity.object.shape;
                let choices = shape_distractors(answer, rng);
                (question, choices, ChoiceValue::from(answer.name()))
            }
            QuestionAttr::Color | QuestionAttr::Size => {
                let objects = self.section_objects(panel, section, &stage)?;
                if objects.is_empty() {
                    return Err(empty(panel, section));
                }
                let panel_attr = if attribute == QuestionAttr::Color {
                    PanelAttr::Color
                } else {
                    PanelAttr::Size
                };
                let mut b = ProgramBuilder::new();
                let scoped = push_section(&mut b, panel, section);
                b.op(OpKind::AllEqual(panel_attr), &[scoped]);
                let answer = match self.evaluate(b)? {
                    Outcome::Invalid if objects.len() == 1 => ONLY_ONE_OBJECT.to_string(),
                    Outcome::Value(Value::Text(text)) => text,
                    other => return Err(unexpected(&stage, &other)),
                };
                let question = format!("Are all objects in {phrase} of the same {attribute}?");
                (question, texts(&["Yes", "No", ONLY_ONE_OBJECT]), ChoiceValue::Text(answer))
            }
        };
        choices.shuffle(rng);

        Ok(self.generated(
            question,
            choices,
            answer,
            self.panel_dir.join(format!("panel_{}.png", panel + 1)),
            stage,
            attribute,
        ))
    }

    fn two_panels(
        &mut self,
        attribute: QuestionAttr,
        panel: usize,
        section: &Section,
        rng: &mut StdRng,
    ) -> SynthResult<ChainQuestion> {
        let stage = section.stage(&format!("two_panels_{}_{}", panel + 1, panel + 2));
        self.check_panel(panel + 1)?;

        let mut b = ProgramBuilder::new();
        let left = push_section(&mut b, panel, section);
        let right = push_section(&mut b, panel + 1, section);
        let (body, choices) = match attribute {
            QuestionAttr::Number => {
                let left = b.op(OpKind::Count, &[left]);
                let right = b.op(OpKind::Count, &[right]);
                b.op(OpKind::CompareNumber, &[left, right]);
                (TWO_PANEL_NUMBER, &["The same", "More", "Fewer"][..])
            }
            QuestionAttr::Position => {
                b.op(OpKind::TwoPanel(PanelAttr::Position), &[left, right]);
                (TWO_PANEL_POSITION, &["Yes", "No"][..])
            }
            QuestionAttr::Shape => {
                b.op(OpKind::TwoPanel(PanelAttr::Shape), &[left, right]);
                (TWO_PANEL_SHAPE, &["The same", "Fewer", "More", "Not comparable"][..])
            }
            QuestionAttr::Size => {
                b.op(OpKind::TwoPanel(PanelAttr::Size), &[left, right]);
                (TWO_PANEL_SIZE, &["The same", "Smaller", "Larger", "Not comparable"][..])
            }
            QuestionAttr::Color => {
                b.op(OpKind::TwoPanel(PanelAttr::Color), &[left, right]);
                (TWO_PANEL_COLOR, &["The same", "Darker", "Brighter", "Not comparable"][..])
            }
        };
        let answer = match self.evaluate(b)? {
            Outcome::Value(Value::Text(text)) => text,
            Outcome::Invalid => return Err(empty(panel, section)),
            other => return Err(unexpected(&stage, &other)),
        };

        let question = if section.is_whole() {
            body.to_string()
        } else {
            format!("Consider only the {} part of the two panels in the image. {body}", section.name)
        };
        let mut choices = texts(choices);
        choices.shuffle(rng);

        Ok(self.generated(
            question,
            choices,
            ChoiceValue::Text(answer),
            self.panel_dir
                .join(format!("panel_combination_{}_{}.png", panel + 1, panel + 2)),
            stage,
            attribute,
        ))
    }

    fn row(&self, attribute: QuestionAttr, row: RowStage, section: &Section) -> SynthResult<ChainQuestion> {
        let phrase = format!("the {attribute} of");
        let template = self
            .document
            .questions
            .iter()
            .find(|t| {
                t.template_filename.contains(row.marker())
                    && section.mentioned_in(&t.question)
                    && match attribute {
                        QuestionAttr::Number => t.choices.iter().any(|c| c.as_text().contains(NUMBER_TEMPLATE_MARK)),
                        _ => t.question.contains(&phrase),
                    }
            })
            .ok_or_else(|| SynthError::MissingTemplate {
                config: self.config.name().to_string(),
                template: row.marker(),
                attribute: attribute.name(),
                section: if section.is_whole() {
                    String::new()
                } else {
                    format!(" ({})", section.name)
                },
            })?;

        Ok(ChainQuestion {
            question: template.question.clone(),
            choices: Some(template.choices.clone()),
            correct_answer: template.answer.clone(),
            config: template.config.clone(),
            image_path: self
                .dataset_root
                .join(&template.config)
                .join(&template.image_filename)
                .display()
                .to_string(),
            stage: section.stage(row.base()),
            attribute: Some(attribute),
        })
    }

    fn generated(
        &self,
        question: String,
        choices: Vec<ChoiceValue>,
        answer: ChoiceValue,
        image: PathBuf,
        stage: String,
        attribute: QuestionAttr,
    ) -> ChainQuestion {
        ChainQuestion {
            question,
            choices: Some(choices),
            correct_answer: answer,
            config: self.config.name().to_string(),
            image_path: image.display().to_string(),
            stage,
            attribute: Some(attribute),
        }
    }

    fn check_panel(&self, panel: usize) -> SynthResult<()> {
        let count = self.document.panels.len();
        if panel < count {
            Ok(())
        } else {
            Err(SynthError::MissingPanel { index: panel, count })
        }
    }

    fn evaluate(&mut self, builder: ProgramBuilder) -> SynthResult<Outcome> {
        let program = builder.build()?;
        Ok(self.ctx.answer(&program)?)
    }

    fn section_objects(&mut self, panel: usize, section: &Section, stage: &str) -> SynthResult<Vec<Entity>> {
        let mut b = ProgramBuilder::new();
        push_section(&mut b, panel, section);
        match self.evaluate(b)? {
            Outcome::Value(Value::Objects(objects)) => Ok(objects),
            other => Err(unexpected(stage, &other)),
        }
    }

    fn pick_object(
        &mut self,
        panel: usize,
        section: &Section,
        stage: &str,
        rng: &mut StdRng,
    ) -> SynthResult<Entity> {
        self.section_objects(panel, section, stage)?
            .choose(rng)
            .cloned()
            .ok_or_else(|| empty(panel, section))
    }

    /// Sampled answer space that always contains `answer`
    fn position_choices(&self, answer: &str, rng: &mut StdRng) -> Vec<ChoiceValue> {
        let space = self.config.position_space();
        let amount = self.config.position_choice_count().min(space.len());
        let mut choices: Vec<&str> = space.choose_multiple(rng, amount).copied().collect();
        if !choices.contains(&answer) && !choices.is_empty() {
            let slot = rng.random_range(0..choices.len());
            choices[slot] = answer;
        }
        texts(&choices)
    }
}

/// `scene -> query_panel[panel] -> partition?`, returning the last index
fn push_section(builder: &mut ProgramBuilder, panel: usize, section: &Section) -> usize {
    let scene = builder.op(OpKind::Scene, &[]);
    let objects = builder.op_with(OpKind::QueryPanel, &[scene], panel_literal(panel));
    match section.region {
        Some(region) => builder.op(OpKind::Region(region), &[objects]),
        None => objects,
    }
}

fn panel_literal(panel: usize) -> SideInput {
    SideInput::number(i64::try_from(panel).unwrap_or(i64::MAX))
}

/// Three distinct counts in `1..=9` other than `answer`, plus `answer`
fn number_distractors(answer: i64, rng: &mut StdRng) -> Vec<ChoiceValue> {
    let mut picked: Vec<i64> = Vec::with_capacity(4);
    while picked.len() < 3 {
        let candidate = rng.random_range(1..=9);
        if candidate != answer && !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    picked.push(answer);
    picked.into_iter().map(ChoiceValue::Integer).collect()
}

/// Three other shapes plus `answer`
fn shape_distractors(answer: Shape, rng: &mut StdRng) -> Vec<ChoiceValue> {
    let others: Vec<Shape> = Shape::ALL.into_iter().filter(|s| *s != answer).collect();
    others
        .choose_multiple(rng, 3)
        .chain(std::iter::once(&answer))
        .map(|s| ChoiceValue::from(s.name()))
        .collect()
}

fn texts(choices: &[&str]) -> Vec<ChoiceValue> {
    choices.iter().map(|&c| ChoiceValue::from(c)).collect()
}

fn empty(panel: usize, section: &Section) -> SynthError {
    SynthError::EmptyRegion {
        panel,
        section: section.label(),
    }
}

fn unexpected(stage: &str, outcome: &Outcome) -> SynthError {
    SynthError::UnexpectedAnswer {
        stage: stage.to_string(),
        found: outcome.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use raven_test_utils::{create_document, create_object};
    use std::collections::BTreeSet;

    const LR: &str = "left_center_single_right_center_single";
    const IN_FOUR: &str = "in_distribute_four_out_center_single";

    fn derive(document: &SceneDocument, seed: u64) -> Vec<ChainQuestion> {
        let mut rng = StdRng::seed_from_u64(seed);
        let template = document.questions[0].clone();
        derive_chain(document, &template, Path::new("/data"), &mut rng).unwrap()
    }

    fn find<'q>(questions: &'q [ChainQuestion], attribute: QuestionAttr, stage: &str) -> &'q ChainQuestion {
        questions
            .iter()
            .find(|q| q.attribute == Some(attribute) && q.stage == stage)
            .unwrap_or_else(|| panic!("no {attribute} question at {stage}"))
    }

    fn choice_set(question: &ChainQuestion) -> BTreeSet<String> {
        question
            .choices
            .iter()
            .flatten()
            .map(|c| c.as_text().into_owned())
            .collect()
    }

    #[test]
    fn whole_panel_chain_has_seven_stages_per_attribute() {
        let questions = derive(&create_document("center_single", &[]), 1);
        assert_eq!(questions.len(), 5 * 7);
        let stages: Vec<&str> = questions[..7].iter().map(|q| q.stage.as_str()).collect();
        assert_eq!(
            stages,
            vec![
                "single_panel_1",
                "single_panel_2",
                "single_panel_3",
                "two_panels_1_2",
                "two_panels_2_3",
                "one_row",
                "two_rows",
            ]
        );
        assert!(questions[..7].iter().all(|q| q.attribute == Some(QuestionAttr::Number)));
    }

    #[test]
    fn number_questions_count_and_compare() {
        let questions = derive(&create_document("distribute_four", &[]), 3);
        let single = find(&questions, QuestionAttr::Number, "single_panel_3");
        assert_eq!(single.correct_answer, ChoiceValue::Integer(4));
        assert_eq!(single.question, "How many objects are in the panel?");
        let values: BTreeSet<String> = choice_set(single);
        assert_eq!(values.len(), 4);
        assert!(values.contains("4"));
        assert_eq!(single.image_path, "/data/distribute_four/7/panel_3.png");

        let pair = find(&questions, QuestionAttr::Number, "two_panels_1_2");
        assert_eq!(pair.correct_answer, ChoiceValue::from("Fewer"));
        assert!(pair.image_path.ends_with("7/panel_combination_1_2.png"));
    }

    #[test]
    fn size_and_color_consistency() {
        let questions = derive(&create_document("distribute_four", &[]), 5);
        assert_eq!(find(&questions, QuestionAttr::Size, "single_panel_1").correct_answer, ChoiceValue::from("Yes"));
        assert_eq!(find(&questions, QuestionAttr::Size, "single_panel_2").correct_answer, ChoiceValue::from("No"));
        assert_eq!(
            find(&questions, QuestionAttr::Size, "two_panels_1_2").correct_answer,
            ChoiceValue::from("Not comparable")
        );
        assert_eq!(
            find(&questions, QuestionAttr::Color, "two_panels_2_3").correct_answer,
            ChoiceValue::from("Brighter")
        );

        let single = derive(&create_document("center_single", &[]), 5);
        let color = find(&single, QuestionAttr::Color, "single_panel_2");
        assert_eq!(color.correct_answer, ChoiceValue::from(ONLY_ONE_OBJECT));
        assert_eq!(color.question, "Are all objects in the panel of the same color?");
    }

    #[test]
    fn shape_question_names_object_position() {
        let questions = derive(&create_document("center_single", &[]), 9);
        let shape = find(&questions, QuestionAttr::Shape, "single_panel_1");
        assert_eq!(shape.question, "What is the shape of the object at center in the panel?");
        assert_eq!(shape.correct_answer, ChoiceValue::from("triangle"));
        assert_eq!(choice_set(shape).len(), 4);
        assert_eq!(
            find(&questions, QuestionAttr::Shape, "two_panels_1_2").correct_answer,
            ChoiceValue::from("Fewer")
        );
    }

    #[test]
    fn position_choices_contain_answer() {
        for seed in 0..20 {
            let questions = derive(&create_document("distribute_four", &[]), seed);
            for panel in 1..=3 {
                let q = find(&questions, QuestionAttr::Position, &format!("single_panel_{panel}"));
                let choices = choice_set(q);
                assert_eq!(choices.len(), 4);
                assert!(choices.contains(&*q.correct_answer.as_text()));
            }
        }
    }

    #[test]
    fn split_layout_repeats_stages_per_section() {
        let questions = derive(&create_document(LR, &["the left", "the right"]), 2);
        assert_eq!(questions.len(), 5 * 7 * 2);
        let left = find(&questions, QuestionAttr::Number, "single_panel_2_left");
        assert_eq!(left.question, "How many objects are in the left part of the panel?");
        assert_eq!(left.correct_answer, ChoiceValue::Integer(1));

        let size = find(&questions, QuestionAttr::Size, "two_panels_1_2_right");
        assert!(size
            .question
            .starts_with("Consider only the right part of the two panels in the image. Is the size"));
        assert_eq!(size.correct_answer, ChoiceValue::from("Smaller"));

        let position = find(&questions, QuestionAttr::Position, "single_panel_1_right");
        assert_eq!(position.correct_answer, ChoiceValue::from("right"));
        assert_eq!(choice_set(position), BTreeSet::from(["left".to_string(), "right".to_string()]));

        let row = find(&questions, QuestionAttr::Shape, "two_rows_left");
        assert!(row.question.contains("the left"));
        assert_eq!(row.image_path, format!("/data/{LR}/7/image.png"));
    }

    #[test]
    fn inner_section_uses_quadrant_wording() {
        let questions = derive(&create_document(IN_FOUR, &["inner", "the outer"]), 4);
        let shape = find(&questions, QuestionAttr::Shape, "single_panel_1_in");
        assert_eq!(
            shape.question,
            "What is the shape of the object in the top-left of the inner part of the panel?"
        );
        let outer = find(&questions, QuestionAttr::Shape, "single_panel_1_out");
        assert_eq!(outer.question, "What is the shape of the object in the outer part of the panel?");
        assert_eq!(outer.correct_answer, ChoiceValue::from("square"));
        assert_eq!(
            find(&questions, QuestionAttr::Size, "single_panel_3_in").correct_answer,
            ChoiceValue::from("Yes")
        );
    }

    #[test]
    fn missing_templates_and_empty_sections_are_skipped() {
        let mut document = create_document(LR, &["the left"]);
        document.panels[0].retain(|o| o.position != "right");
        let questions = derive(&document, 6);
        assert!(questions.iter().all(|q| q.stage != "one_row_right"));
        assert!(questions
            .iter()
            .all(|q| !(q.stage == "single_panel_1_right" && q.attribute == Some(QuestionAttr::Shape))));
        assert!(questions.iter().any(|q| q.stage == "one_row_left"));
    }

    #[test]
    fn short_documents_fail() {
        let mut document = create_document("center_single", &[]);
        document.panels.truncate(2);
        let template = document.questions[0].clone();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            derive_chain(&document, &template, Path::new("/data"), &mut rng),
            Err(SynthError::MissingPanel { index: 2, count: 2 })
        ));
    }

    #[test]
    fn unknown_configuration_fails() {
        let mut document = create_document("center_single", &[]);
        document.panels.push(vec![create_object(Shape::Circle, 1, 1, "center")]);
        let mut template = document.questions[0].clone();
        template.config = "center_double".into();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            derive_chain(&document, &template, Path::new("/data"), &mut rng),
            Err(SynthError::UnknownConfig(_))
        ));
    }

    #[test]
    fn derivation_is_seeded() {
        let document = create_document("distribute_four", &[]);
        assert_eq!(derive(&document, 11), derive(&document, 11));
    }
}
