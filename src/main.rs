//! Experimento CLI
//!
//! Read-only inspection of experiment output directories.
//!
//! # Usage
//!
//! ```bash
//! # Summarize every metric CSV of an experiment
//! experimento summary resnet-baseline
//!
//! # Summarize one metric
//! experimento summary resnet-baseline --metric loss
//!
//! # Show a checkpoint's contents
//! experimento inspect resnet-baseline --file checkpoint.json
//! ```

use clap::Parser;
use experimento::cli::{Cli, Command, InspectArgs, SummaryArgs};
use experimento::{checkpoint, metrics, Experiment};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let result = match cli.command {
        Command::Summary(args) => run_summary(args, log_level),
        Command::Inspect(args) => run_inspect(args, log_level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

fn run_summary(args: SummaryArgs, level: LogLevel) -> Result<(), String> {
    let exp = Experiment::with_root(&args.experiment_id, &args.root);

    let metric_names = match args.metric {
        Some(metric) => vec![metric],
        None => discover_metrics(&exp).map_err(|e| format!("Failed to list metrics: {e}"))?,
    };

    if metric_names.is_empty() {
        log(
            level,
            LogLevel::Normal,
            &format!("No metric files under {}", exp.dir().display()),
        );
        return Ok(());
    }

    log(
        level,
        LogLevel::Normal,
        &format!("Experiment {} ({})", exp.id(), exp.dir().display()),
    );

    for name in metric_names {
        let series =
            metrics::read_metric(&exp, &name).map_err(|e| format!("Metric {name}: {e}"))?;

        match series.stats() {
            Some(stats) => {
                println!();
                println!("{name}: {} epochs", series.len());
                println!(
                    "  mean={:.4} std={:.4} min={:.4} max={:.4}",
                    stats.mean, stats.std, stats.min, stats.max
                );
                if let Some(last) = series.last() {
                    println!("  last: epoch {} = {}", last.epoch, last.value);
                }
                println!("  {}", series.sparkline());
                if stats.has_nan || stats.has_inf {
                    println!("  warning: series contains non-finite values");
                }

                if level == LogLevel::Verbose {
                    for point in series.points() {
                        println!("    {},{}", point.epoch, point.value);
                    }
                }
            }
            None => println!("{name}: empty"),
        }
    }

    Ok(())
}

fn run_inspect(args: InspectArgs, level: LogLevel) -> Result<(), String> {
    let exp = Experiment::with_root(&args.experiment_id, &args.root);

    let ckpt = checkpoint::read_checkpoint(&exp, &args.file)
        .map_err(|e| format!("Checkpoint error: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Checkpoint {}", exp.file_path(&args.file).display()),
    );
    println!("  next epoch: {}", ckpt.next_epoch);
    println!("  best accuracy: {}", ckpt.best_acc);

    println!("  model parameters ({} values):", ckpt.model.value_count());
    for (name, values) in ckpt.model.entries() {
        println!("    {name}: {} values", values.len());
    }

    println!(
        "  optimizer parameters ({} values):",
        ckpt.optimizer.value_count()
    );
    for (name, values) in ckpt.optimizer.entries() {
        println!("    {name}: {} values", values.len());
    }

    Ok(())
}

/// Metric names discovered from the CSV files in the experiment directory
fn discover_metrics(exp: &Experiment) -> experimento::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(exp.dir())? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("csv") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
