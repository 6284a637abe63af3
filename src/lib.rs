//! # Experimento: Experiment Utilities for Training Runs
//!
//! Experimento provides the filesystem-level utilities a training loop
//! needs: reproducible seeding, a per-experiment logger, per-epoch metric
//! CSVs, checkpoint save/restore, and terminal inspection of image
//! tensors. It deliberately owns no model, optimizer, or tensor math;
//! callers plug their own types in through the [`Stateful`] seam.
//!
//! ## Architecture
//!
//! - **experiment**: Directory layout of a single run (`out/<id>/...`)
//! - **seed**: Process-wide RNG seeding for reproducibility
//! - **logging**: Per-experiment file + stderr logger (tracing)
//! - **state**: Named parameter vectors and the `Stateful` seam
//! - **checkpoint**: Save/resume training state (JSON, YAML, SafeTensors)
//! - **metrics**: Append-only per-epoch CSV series with summaries
//! - **inspect**: Grid assembly and terminal rendering of image tensors

pub mod checkpoint;
pub mod cli;
pub mod error;
pub mod experiment;
pub mod inspect;
pub mod logging;
pub mod metrics;
pub mod seed;
pub mod state;

// Re-export commonly used types
pub use checkpoint::{
    load_best_model, load_checkpoint, save_checkpoint, save_model, Checkpoint, CheckpointFormat,
    Resume,
};
pub use error::{Error, Result};
pub use experiment::Experiment;
pub use metrics::{append_metric, read_metric, MetricPoint, MetricSeries, MetricStats};
pub use seed::fix_all_seeds;
pub use state::{StateDict, Stateful};
