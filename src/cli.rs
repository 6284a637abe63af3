//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! experimento summary resnet-baseline
//! experimento summary resnet-baseline --metric loss
//! experimento inspect resnet-baseline
//! experimento inspect resnet-baseline --file checkpoint.yaml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Experimento: inspect the output of a training run
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "experimento")]
#[command(version)]
#[command(about = "Inspect experiment output: metric series and checkpoints")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Summarize metric CSVs for an experiment
    Summary(SummaryArgs),

    /// Show the contents of a saved checkpoint
    Inspect(InspectArgs),
}

/// Arguments for the summary command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SummaryArgs {
    /// Experiment identifier (directory under the output root)
    #[arg(value_name = "EXPERIMENT_ID")]
    pub experiment_id: String,

    /// Output root directory
    #[arg(long, default_value = "out")]
    pub root: PathBuf,

    /// Only summarize this metric
    #[arg(short, long)]
    pub metric: Option<String>,
}

/// Arguments for the inspect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectArgs {
    /// Experiment identifier (directory under the output root)
    #[arg(value_name = "EXPERIMENT_ID")]
    pub experiment_id: String,

    /// Output root directory
    #[arg(long, default_value = "out")]
    pub root: PathBuf,

    /// Checkpoint file name inside the experiment directory
    #[arg(short, long, default_value = "checkpoint.json")]
    pub file: String,
}
