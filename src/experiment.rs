//! Experiment directory layout
//!
//! Every artifact of a training run (logs, metric CSVs, checkpoints, model
//! files) lives under `root/<experiment_id>/`. All path resolution goes
//! through [`Experiment`] so the layout is defined in exactly one place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// Default root directory for experiment output
pub const DEFAULT_ROOT: &str = "out";

/// Handle to a single experiment's output directory
///
/// # Example
///
/// ```
/// use experimento::Experiment;
///
/// let exp = Experiment::new("resnet-baseline");
/// assert_eq!(exp.metric_path("loss").to_str().unwrap(), "out/resnet-baseline/loss.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    id: String,
    root: PathBuf,
}

impl Experiment {
    /// Create an experiment handle under the default output root
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_root(id, DEFAULT_ROOT)
    }

    /// Create an experiment handle under a custom output root
    pub fn with_root(id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
        }
    }

    /// Experiment identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Output root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all artifacts of this experiment
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.id)
    }

    /// Directory holding this experiment's log files
    pub fn logs_dir(&self) -> PathBuf {
        self.dir().join("logs")
    }

    /// Path of the CSV file tracking one metric
    pub fn metric_path(&self, metric: &str) -> PathBuf {
        self.dir().join(format!("{metric}.csv"))
    }

    /// Path of an arbitrary file inside the experiment directory
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }

    /// Create the experiment and log directories (idempotent)
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
