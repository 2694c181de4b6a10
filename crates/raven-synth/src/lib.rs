//! RAVEN logical-chain question synthesizer
//!
//! Samples scene documents from a dataset tree and turns each into a chain
//! of questions that builds from single panels up to the full puzzle.
//!
//! # Core Concepts
//!
//! - [`SceneStore`]: the `<config>/<index>/question.json` tree and the
//!   matching `.npz` answer archives
//! - [`Configuration`] / [`Section`]: panel layouts and the regions each
//!   question is scoped to
//! - [`derive_chain`]: per-attribute, per-stage questions answered by
//!   `raven-engine` programs or by the document's row templates
//! - [`final_question`]: the puzzle prompt answered by the archive target
//!
//! # Example
//!
//! ```rust,ignore
//! use raven_synth::{run, write_output, SynthConfig};
//!
//! let config = SynthConfig::from_env()?;
//! let instances = run(&config)?;
//! write_output(&config.output_path, &instances)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod archive;
pub mod chain;
pub mod config;
pub mod error;
pub mod layout;
pub mod lettering;
pub mod prompt;
pub mod question;
pub mod store;

pub use archive::read_target;
pub use chain::derive_chain;
pub use config::{SynthConfig, CONFIG_ENV};
pub use error::{SynthError, SynthResult};
pub use layout::{Configuration, Section};
pub use lettering::{letter_choices, normalize_answer};
pub use prompt::{final_question, puzzle_prompt};
pub use question::{ChainInstance, ChainQuestion, QuestionAttr};
pub use store::{Sample, SceneStore};

use rand::rngs::StdRng;
use rand::SeedableRng;
use raven_scene::SceneDocument;
use std::path::Path;
use tracing::info;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seeded generator over one scene store
#[derive(Debug)]
pub struct Synthesizer {
    store: SceneStore,
    rng: StdRng,
}

impl Synthesizer {
    /// Synthesizer over the roots and seed of `config`
    #[must_use]
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            store: SceneStore::new(&config.dataset_root, &config.archive_root),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    /// Draw documents from every configuration
    ///
    /// # Errors
    ///
    /// See [`SceneStore::sample`].
    pub fn sample(&mut self, per_config: usize) -> SynthResult<Vec<Sample>> {
        self.store.sample(per_config, &mut self.rng)
    }

    /// Full chain of one sampled document, final question last
    ///
    /// # Errors
    ///
    /// - [`SynthError::Scene`] if the document cannot be loaded
    /// - [`SynthError::NoTemplates`] / [`SynthError::MissingFilename`] if it
    ///   lacks the metadata carried by its template questions
    /// - anything [`derive_chain`] or [`read_target`] returns
    pub fn instance(&mut self, sample: &Sample) -> SynthResult<ChainInstance> {
        let document = SceneDocument::load(&sample.path)?;
        let template = document
            .questions
            .first()
            .ok_or_else(|| SynthError::NoTemplates(sample.path.clone()))?;
        let original = template
            .filename
            .clone()
            .ok_or_else(|| SynthError::MissingFilename(sample.path.clone()))?;
        let config: Configuration = template.config.parse()?;

        let mut questions = derive_chain(&document, template, self.store.dataset_root(), &mut self.rng)?;
        let target = read_target(self.store.archive_path(&template.config, &original))?;
        let first_image = questions
            .first()
            .map(|q| q.image_path.clone())
            .unwrap_or_else(|| {
                self.store
                    .dataset_root()
                    .join(&template.config)
                    .join(&template.image_filename)
                    .display()
                    .to_string()
            });
        questions.push(final_question(config, target, Path::new(&first_image)));
        questions.iter_mut().for_each(letter_choices);

        info!(
            path = %sample.path.display(),
            config = %config,
            questions = questions.len(),
            "generated logical chain"
        );
        Ok(ChainInstance {
            file_path: sample.path.display().to_string(),
            questions,
            original_filename: original,
        })
    }
}

/// Sample the dataset and build every chain
///
/// # Errors
///
/// The first error of [`Synthesizer::sample`] or [`Synthesizer::instance`].
pub fn run(config: &SynthConfig) -> SynthResult<Vec<ChainInstance>> {
    let mut synthesizer = Synthesizer::new(config);
    let samples = synthesizer.sample(config.samples_per_config)?;
    info!(documents = samples.len(), seed = config.seed, "sampled dataset");
    samples.iter().map(|sample| synthesizer.instance(sample)).collect()
}

/// Write chains as pretty-printed JSON
///
/// # Errors
///
/// [`SynthError::Json`] if serialization fails, [`SynthError::Io`] if the
/// file cannot be written.
pub fn write_output(path: impl AsRef<Path>, instances: &[ChainInstance]) -> SynthResult<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(instances)?;
    std::fs::write(path, text).map_err(|e| SynthError::io_error(path, e))?;
    info!(path = %path.display(), instances = instances.len(), "wrote output");
    Ok(())
}
