//! Per-experiment logger
//!
//! Installs a global `tracing` subscriber with two layers: a plain-text
//! file layer writing to `root/<id>/logs/<timestamp>.log` and a
//! human-readable stderr layer. Level filtering honors `RUST_LOG` and
//! defaults to `info`.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::experiment::Experiment;
use crate::{Error, Result};

/// Keeps the log file worker alive
///
/// Dropping the guard flushes buffered log lines to the file. Hold it for
/// the lifetime of the training run.
pub struct LogGuard {
    path: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    /// Path of the log file this run writes to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LogGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogGuard")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Set up logging for an experiment
///
/// Creates `root/<id>/logs/` and a log file named with the current local
/// time (`%Y-%m-%d-%H-%M.log`), then installs the global subscriber.
/// Fails if a global subscriber is already set.
pub fn init(exp: &Experiment) -> Result<LogGuard> {
    exp.ensure_dirs()?;

    let stamp = chrono::Local::now().format("%Y-%m-%d-%H-%M");
    let file_name = format!("{stamp}.log");
    let path = exp.logs_dir().join(&file_name);

    let appender = tracing_appender::rolling::never(exp.logs_dir(), file_name);
    let (non_blocking, worker) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(env_filter());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| Error::Logger(e.to_string()))?;

    tracing::info!(experiment = %exp.id(), log = %path.display(), "logger initialized");

    Ok(LogGuard {
        path,
        _worker: worker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // The subscriber is process-global, so the whole lifecycle is covered
    // by a single test.
    #[test]
    fn test_init_writes_log_file_and_rejects_double_init() {
        let tmp = tempfile::tempdir().unwrap();
        let exp = Experiment::with_root("log-test", tmp.path());

        let guard = init(&exp).unwrap();
        assert!(guard.path().starts_with(exp.logs_dir()));
        assert!(exp.logs_dir().is_dir());

        tracing::info!("a line destined for the experiment log");

        // Second init fails: the global subscriber is already set
        assert!(matches!(init(&exp), Err(Error::Logger(_))));

        let path = guard.path().to_path_buf();
        drop(guard); // flushes the worker
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("a line destined for the experiment log"));
    }
}
