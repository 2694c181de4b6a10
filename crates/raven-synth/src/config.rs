//! Synthesizer configuration
//!
//! Loaded from a TOML file named by `RAVEN_SYNTH_CONFIG`; every field has
//! a default so an absent variable or a partial file is fine.

use crate::error::{SynthError, SynthResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "RAVEN_SYNTH_CONFIG";

/// Synthesizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Root of `<config>/<index>/question.json` scene documents
    pub dataset_root: PathBuf,
    /// Root of `<config>/<name>.npz` answer archives
    pub archive_root: PathBuf,
    /// Documents sampled per configuration directory
    pub samples_per_config: usize,
    /// Seed for all sampling and shuffling
    pub seed: u64,
    /// Output JSON file
    pub output_path: PathBuf,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("./dataset"),
            archive_root: PathBuf::from("./RAVEN"),
            samples_per_config: 10,
            seed: 42,
            output_path: PathBuf::from("logical_chain_questions.json"),
        }
    }
}

impl SynthConfig {
    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// [`SynthError::Config`] when the text does not match the schema.
    pub fn from_toml(text: &str) -> SynthResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    ///
    /// [`SynthError::Io`] if unreadable, [`SynthError::Config`] if invalid.
    pub fn load(path: impl AsRef<Path>) -> SynthResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SynthError::io_error(path, e))?;
        Self::from_toml(&text)
    }

    /// Configuration named by [`CONFIG_ENV`], or the defaults when unset
    ///
    /// # Errors
    ///
    /// Same as [`SynthConfig::load`].
    pub fn from_env() -> SynthResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}
