//! Per-epoch metric CSV series
//!
//! One CSV file per metric, `root/<id>/<metric>.csv`, with the header row
//! `epoch,<metric>` and one `epoch,value` row appended per call. Files are
//! appended across process restarts, so a resumed run keeps extending the
//! same series.
//!
//! # Example
//!
//! ```no_run
//! use experimento::{Experiment, metrics};
//!
//! let exp = Experiment::new("resnet-baseline");
//! metrics::append_metric(&exp, "loss", 0, 1.73)?;
//! metrics::append_metric(&exp, "loss", 1, 1.21)?;
//!
//! let series = metrics::read_metric(&exp, "loss")?;
//! assert_eq!(series.len(), 2);
//! # Ok::<(), experimento::Error>(())
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::experiment::Experiment;
use crate::{Error, Result};

/// One row of a metric CSV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    /// Epoch number
    pub epoch: usize,

    /// Metric value
    pub value: f64,
}

/// Statistical summary of a metric series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricStats {
    /// Number of finite values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Standard deviation
    pub std: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Whether any NaN values were recorded
    pub has_nan: bool,
    /// Whether any Inf values were recorded
    pub has_inf: bool,
}

/// Running statistics using Welford's algorithm for numerical stability
#[derive(Debug, Clone)]
struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64, // Sum of squares of differences from mean
    min: f64,
    max: f64,
    has_nan: bool,
    has_inf: bool,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            has_nan: false,
            has_inf: false,
        }
    }
}

impl RunningStats {
    fn update(&mut self, value: f64) {
        if value.is_nan() {
            self.has_nan = true;
            return;
        }
        if value.is_infinite() {
            self.has_inf = true;
            // Still update min/max for infinities
            self.min = self.min.min(value);
            self.max = self.max.max(value);
            return;
        }

        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    fn std(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).sqrt()
    }

    fn to_stats(&self) -> MetricStats {
        MetricStats {
            count: self.count,
            mean: self.mean,
            std: self.std(),
            min: self.min,
            max: self.max,
            has_nan: self.has_nan,
            has_inf: self.has_inf,
        }
    }
}

/// A metric's full per-epoch history, read back from its CSV
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    metric: String,
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Metric name
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// All recorded points, in file order
    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    /// Number of recorded points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last recorded point
    pub fn last(&self) -> Option<&MetricPoint> {
        self.points.last()
    }

    /// Best point by value, ignoring NaN entries
    pub fn best(&self, higher_is_better: bool) -> Option<&MetricPoint> {
        let candidates = self.points.iter().filter(|p| !p.value.is_nan());
        if higher_is_better {
            candidates.max_by(|a, b| a.value.total_cmp(&b.value))
        } else {
            candidates.min_by(|a, b| a.value.total_cmp(&b.value))
        }
    }

    /// Statistical summary, or `None` for an empty series
    pub fn stats(&self) -> Option<MetricStats> {
        if self.points.is_empty() {
            return None;
        }
        let mut running = RunningStats::default();
        for point in &self.points {
            running.update(point.value);
        }
        Some(running.to_stats())
    }

    /// Unicode sparkline over the finite values
    pub fn sparkline(&self) -> String {
        const CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
        let values: Vec<f64> = self
            .points
            .iter()
            .map(|p| p.value)
            .filter(|v| v.is_finite())
            .collect();

        if values.is_empty() {
            return String::new();
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        if range == 0.0 {
            return CHARS[4].to_string().repeat(values.len());
        }

        values
            .iter()
            .map(|v| {
                let idx = (((v - min) / range) * 7.0).round() as usize;
                CHARS[idx.min(7)]
            })
            .collect()
    }
}

/// The metric name doubles as a file name, so keep it path-safe
fn validate_metric_name(metric: &str) -> Result<()> {
    if metric.is_empty() {
        return Err(Error::InvalidParameter(
            "metric name must not be empty".to_string(),
        ));
    }
    if metric.contains(['/', '\\']) || metric.starts_with('.') {
        return Err(Error::InvalidParameter(format!(
            "metric name {metric:?} is not a valid file name"
        )));
    }
    Ok(())
}

/// Append one epoch's value to a metric CSV
///
/// Creates the file with its header row on first use, then appends one
/// `epoch,value` row per call.
pub fn append_metric(exp: &Experiment, metric: &str, epoch: usize, value: f64) -> Result<PathBuf> {
    validate_metric_name(metric)?;
    exp.ensure_dirs()?;

    let path = exp.metric_path(metric);
    if !path.exists() {
        fs::write(&path, format!("epoch,{metric}\n"))?;
    }

    let mut file = OpenOptions::new().append(true).open(&path)?;
    writeln!(file, "{epoch},{value}")?;

    tracing::debug!(experiment = %exp.id(), metric, epoch, value, "appended metric");

    Ok(path)
}

/// Read a metric's full history back from its CSV
pub fn read_metric(exp: &Experiment, metric: &str) -> Result<MetricSeries> {
    validate_metric_name(metric)?;

    let content = fs::read_to_string(exp.metric_path(metric))?;
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| Error::MalformedCsv("empty metrics file".to_string()))?;
    let expected = format!("epoch,{metric}");
    if header != expected {
        return Err(Error::MalformedCsv(format!(
            "expected header {expected:?}, got {header:?}"
        )));
    }

    let mut points = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 2; // 1-based, after the header
        let (epoch, value) = line.split_once(',').ok_or_else(|| {
            Error::MalformedCsv(format!("line {lineno}: missing column separator"))
        })?;

        let epoch = epoch
            .trim()
            .parse()
            .map_err(|_| Error::MalformedCsv(format!("line {lineno}: invalid epoch {epoch:?}")))?;
        let value = value
            .trim()
            .parse()
            .map_err(|_| Error::MalformedCsv(format!("line {lineno}: invalid value {value:?}")))?;

        points.push(MetricPoint { epoch, value });
    }

    Ok(MetricSeries {
        metric: metric.to_string(),
        points,
    })
}
