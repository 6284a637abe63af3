//! Checkpoint and model saving

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use safetensors::tensor::{Dtype, TensorView};

use super::format::CheckpointFormat;
use super::{Checkpoint, CHECKPOINT_FILE};
use crate::experiment::Experiment;
use crate::state::Stateful;
use crate::{Error, Result};

/// Save a checkpoint under its default file name (`checkpoint.json`)
pub fn save_checkpoint(exp: &Experiment, ckpt: &Checkpoint) -> Result<PathBuf> {
    save_checkpoint_as(exp, ckpt, CHECKPOINT_FILE)
}

/// Save a checkpoint under a custom file name
///
/// The serialization format is chosen by the file extension (`.json`,
/// `.yaml`/`.yml`).
pub fn save_checkpoint_as(exp: &Experiment, ckpt: &Checkpoint, filename: &str) -> Result<PathBuf> {
    if ckpt.best_acc.is_nan() {
        return Err(Error::InvalidParameter(
            "best_acc must not be NaN".to_string(),
        ));
    }

    let format = CheckpointFormat::from_path(filename)?;
    exp.ensure_dirs()?;

    let state = ckpt.to_state();
    let data = match format {
        CheckpointFormat::Json => serde_json::to_string_pretty(&state)
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))?,
        CheckpointFormat::Yaml => serde_yaml::to_string(&state)
            .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}")))?,
    };

    let path = exp.file_path(filename);
    fs::write(&path, data)?;

    tracing::info!(
        experiment = %exp.id(),
        path = %path.display(),
        next_epoch = ckpt.next_epoch,
        digest = %state.digest,
        "saved checkpoint"
    );

    Ok(path)
}

/// Save a model's weights to a SafeTensors file in the experiment directory
///
/// Use this for weights-only snapshots such as
/// [`BEST_MODEL_FILE`](super::BEST_MODEL_FILE).
pub fn save_model<M: Stateful>(model: &M, exp: &Experiment, filename: &str) -> Result<PathBuf> {
    exp.ensure_dirs()?;

    let state = model.state_dict();

    // Collect tensor data with proper lifetime management
    let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = state
        .entries()
        .iter()
        .map(|(name, values)| {
            let data = values.to_vec();
            let bytes: Vec<u8> = bytemuck::cast_slice(&data).to_vec();
            let shape = vec![values.len()];
            (name.clone(), bytes, shape)
        })
        .collect();

    let views: Vec<(&str, TensorView<'_>)> = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytes)
                .map_err(|e| Error::Serialization(format!("SafeTensors view failed: {e}")))?;
            Ok((name.as_str(), view))
        })
        .collect::<Result<_>>()?;

    let mut metadata = HashMap::new();
    metadata.insert("experiment".to_string(), exp.id().to_string());
    metadata.insert("saved_at".to_string(), chrono::Utc::now().to_rfc3339());

    let safetensor_bytes = safetensors::serialize(views, Some(metadata))
        .map_err(|e| Error::Serialization(format!("SafeTensors serialization failed: {e}")))?;

    let path = exp.file_path(filename);
    fs::write(&path, safetensor_bytes)?;

    tracing::info!(
        experiment = %exp.id(),
        path = %path.display(),
        parameters = state.len(),
        "saved model weights"
    );

    Ok(path)
}
