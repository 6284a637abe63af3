//! Checkpoint and model loading

use std::fs;

use ndarray::Array1;
use safetensors::tensor::Dtype;
use safetensors::SafeTensors;

use super::format::CheckpointFormat;
use super::{Checkpoint, CheckpointState, Resume, BEST_MODEL_FILE, CHECKPOINT_FILE};
use crate::experiment::Experiment;
use crate::state::{StateDict, Stateful};
use crate::{Error, Result};

/// Read a checkpoint file without applying it
///
/// Verifies the content digest. Useful for inspection tools that have no
/// live model to restore into.
pub fn read_checkpoint(exp: &Experiment, filename: &str) -> Result<Checkpoint> {
    let path = exp.file_path(filename);
    let format = CheckpointFormat::from_path(&path)?;

    // A missing file surfaces as the underlying I/O error
    let content = fs::read_to_string(&path)?;

    let state: CheckpointState = match format {
        CheckpointFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}")))?,
        CheckpointFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}")))?,
    };

    Checkpoint::from_state(state)
}

/// Load the latest checkpoint and restore model and optimizer state
///
/// Returns the training progress counters so the caller can resume at the
/// right epoch with the right best-accuracy threshold.
pub fn load_checkpoint<M: Stateful, O: Stateful>(
    exp: &Experiment,
    model: &mut M,
    optimizer: &mut O,
) -> Result<Resume> {
    load_checkpoint_from(exp, CHECKPOINT_FILE, model, optimizer)
}

/// Load a checkpoint from a custom file name
pub fn load_checkpoint_from<M: Stateful, O: Stateful>(
    exp: &Experiment,
    filename: &str,
    model: &mut M,
    optimizer: &mut O,
) -> Result<Resume> {
    let ckpt = read_checkpoint(exp, filename)?;

    model.load_state_dict(&ckpt.model)?;
    optimizer.load_state_dict(&ckpt.optimizer)?;

    tracing::info!(
        experiment = %exp.id(),
        next_epoch = ckpt.next_epoch,
        best_acc = ckpt.best_acc,
        "restored checkpoint"
    );

    Ok(Resume {
        next_epoch: ckpt.next_epoch,
        best_acc: ckpt.best_acc,
    })
}

/// Restore the weights that scored best in a previous run
pub fn load_best_model<M: Stateful>(exp: &Experiment, model: &mut M) -> Result<()> {
    load_model_from(exp, BEST_MODEL_FILE, model)
}

/// Restore model weights from a SafeTensors file in the experiment directory
pub fn load_model_from<M: Stateful>(exp: &Experiment, filename: &str, model: &mut M) -> Result<()> {
    let path = exp.file_path(filename);
    let data = fs::read(&path)?;

    let tensors = SafeTensors::deserialize(&data)
        .map_err(|e| Error::Serialization(format!("SafeTensors parsing failed: {e}")))?;

    let mut state = StateDict::new();
    for name in tensors.names() {
        let view = tensors
            .tensor(name)
            .map_err(|e| Error::Serialization(format!("Failed to get tensor {name}: {e}")))?;

        if view.dtype() != Dtype::F32 {
            return Err(Error::Serialization(format!(
                "tensor {name} has unsupported dtype {:?}",
                view.dtype()
            )));
        }

        let values: Vec<f32> = view
            .data()
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        state.insert(name.to_string(), Array1::from(values));
    }

    model.load_state_dict(&state)?;

    tracing::info!(
        experiment = %exp.id(),
        path = %path.display(),
        parameters = state.len(),
        "restored model weights"
    );

    Ok(())
}
