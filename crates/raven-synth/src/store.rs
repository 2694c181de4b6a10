//! Scene store
//!
//! Documents live at `<dataset_root>/<config>/<index>/question.json`; the
//! answer archive of a document lives at
//! `<archive_root>/<config>/<original stem>.npz`.

use crate::error::{SynthError, SynthResult};
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of a scene document inside its sample directory
pub const DOCUMENT_FILE: &str = "question.json";

/// Sampled documents of one configuration directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Configuration directory name
    pub config: String,
    /// Sample index within the directory
    pub index: usize,
    /// Path of the document
    pub path: PathBuf,
}

/// Read access to the dataset and archive trees
#[derive(Debug, Clone)]
pub struct SceneStore {
    dataset_root: PathBuf,
    archive_root: PathBuf,
}

impl SceneStore {
    /// Store over two roots
    pub fn new(dataset_root: impl Into<PathBuf>, archive_root: impl Into<PathBuf>) -> Self {
        Self {
            dataset_root: dataset_root.into(),
            archive_root: archive_root.into(),
        }
    }

    /// Root of the scene documents
    #[must_use]
    pub fn dataset_root(&self) -> &Path {
        &self.dataset_root
    }

    /// Configuration directories, sorted by name
    ///
    /// # Errors
    ///
    /// [`SynthError::Io`] if the dataset root cannot be listed.
    pub fn configurations(&self) -> SynthResult<Vec<String>> {
        let mut names: Vec<String> = read_dir(&self.dataset_root)?
            .into_iter()
            .filter(|path| path.is_dir())
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Sample indices of a configuration that hold a document, ascending
    ///
    /// # Errors
    ///
    /// [`SynthError::Io`] if the configuration directory cannot be listed.
    pub fn available(&self, config: &str) -> SynthResult<Vec<usize>> {
        let mut indices: Vec<usize> = read_dir(&self.dataset_root.join(config))?
            .into_iter()
            .filter(|path| path.join(DOCUMENT_FILE).is_file())
            .filter_map(|path| path.file_name()?.to_str()?.parse().ok())
            .collect();
        indices.sort_unstable();
        Ok(indices)
    }

    /// Path of one document
    #[must_use]
    pub fn document_path(&self, config: &str, index: usize) -> PathBuf {
        self.dataset_root.join(config).join(index.to_string()).join(DOCUMENT_FILE)
    }

    /// Path of a puzzle's answer archive
    ///
    /// The stem is everything before the first `.` of the original name.
    #[must_use]
    pub fn archive_path(&self, config: &str, original_filename: &str) -> PathBuf {
        let stem = original_filename.split('.').next().unwrap_or(original_filename);
        self.archive_root.join(config).join(format!("{stem}.npz"))
    }

    /// Draw up to `per_config` documents from every configuration
    ///
    /// Indices are drawn without replacement. A configuration with fewer
    /// documents than requested contributes all of them.
    ///
    /// # Errors
    ///
    /// [`SynthError::Io`] if a directory cannot be listed.
    pub fn sample(&self, per_config: usize, rng: &mut StdRng) -> SynthResult<Vec<Sample>> {
        let mut samples = Vec::new();
        for config in self.configurations()? {
            let available = self.available(&config)?;
            if available.len() < per_config {
                warn!(
                    config = %config,
                    available = available.len(),
                    requested = per_config,
                    "fewer documents than requested, taking all"
                );
            }
            let amount = per_config.min(available.len());
            let picked = rand::seq::index::sample(rng, available.len(), amount);
            debug!(config = %config, picked = amount, "sampled configuration");
            samples.extend(picked.into_iter().map(|i| Sample {
                path: self.document_path(&config, available[i]),
                config: config.clone(),
                index: available[i],
            }));
        }
        Ok(samples)
    }
}

fn read_dir(dir: &Path) -> SynthResult<Vec<PathBuf>> {
    fs::read_dir(dir)
        .map_err(|e| SynthError::io_error(dir, e))?
        .map(|entry| entry.map(|e| e.path()).map_err(|e| SynthError::io_error(dir, e)))
        .collect()
}
