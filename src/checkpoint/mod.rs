//! Checkpoint save/restore
//!
//! A checkpoint carries everything needed to resume training: the next
//! epoch to run, the best validation accuracy so far, and the model and
//! optimizer state dicts. Full checkpoints serialize to JSON or YAML;
//! weights-only model files use SafeTensors.
//!
//! # Example
//!
//! ```no_run
//! use experimento::{Experiment, Checkpoint, Stateful};
//! use experimento::checkpoint::{save_checkpoint, load_checkpoint};
//! # fn demo(model: &mut impl Stateful, optimizer: &mut impl Stateful) -> experimento::Result<()> {
//! let exp = Experiment::new("resnet-baseline");
//!
//! let ckpt = Checkpoint::capture(5, 0.91, model, optimizer);
//! save_checkpoint(&exp, &ckpt)?;
//!
//! // Later, in a fresh process:
//! let resume = load_checkpoint(&exp, model, optimizer)?;
//! assert_eq!(resume.next_epoch, 5);
//! # Ok(())
//! # }
//! ```

mod format;
mod load;
mod save;

pub use format::CheckpointFormat;
pub use load::{load_best_model, load_checkpoint, load_checkpoint_from, load_model_from, read_checkpoint};
pub use save::{save_checkpoint, save_checkpoint_as, save_model};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::state::{FlatState, StateDict, Stateful};
use crate::{Error, Result};

/// Default checkpoint file name inside the experiment directory
pub const CHECKPOINT_FILE: &str = "checkpoint.json";

/// File name for the weights of the best-scoring model
pub const BEST_MODEL_FILE: &str = "best_model.safetensors";

/// Everything needed to resume a training run
#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// Epoch the resumed run should start with
    pub next_epoch: usize,

    /// Best validation accuracy seen so far
    pub best_acc: f64,

    /// Model parameters
    pub model: StateDict,

    /// Optimizer parameters (moments, step counters, ...)
    pub optimizer: StateDict,
}

impl Checkpoint {
    /// Capture a checkpoint from live model and optimizer
    pub fn capture<M: Stateful, O: Stateful>(
        next_epoch: usize,
        best_acc: f64,
        model: &M,
        optimizer: &O,
    ) -> Self {
        Self {
            next_epoch,
            best_acc,
            model: model.state_dict(),
            optimizer: optimizer.state_dict(),
        }
    }

    /// Convert to the serializable form, stamping time and content digest
    pub fn to_state(&self) -> CheckpointState {
        let model = self.model.to_flat();
        let optimizer = self.optimizer.to_flat();
        let digest = content_digest(&model, &optimizer);

        CheckpointState {
            next_epoch: self.next_epoch,
            best_acc: self.best_acc,
            saved_at: Utc::now(),
            digest,
            model,
            optimizer,
        }
    }

    /// Rebuild from the serialized form, verifying the content digest
    pub fn from_state(state: CheckpointState) -> Result<Self> {
        let expected = content_digest(&state.model, &state.optimizer);
        if expected != state.digest {
            return Err(Error::DigestMismatch {
                expected,
                got: state.digest,
            });
        }

        Ok(Self {
            next_epoch: state.next_epoch,
            best_acc: state.best_acc,
            model: StateDict::from_flat(&state.model)?,
            optimizer: StateDict::from_flat(&state.optimizer)?,
        })
    }
}

/// Serialized checkpoint contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Epoch the resumed run should start with
    pub next_epoch: usize,

    /// Best validation accuracy seen so far
    pub best_acc: f64,

    /// Save timestamp
    pub saved_at: DateTime<Utc>,

    /// Content digest over the parameter data
    pub digest: String,

    /// Flattened model parameters
    pub model: FlatState,

    /// Flattened optimizer parameters
    pub optimizer: FlatState,
}

/// Training progress restored from a checkpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resume {
    /// Epoch the resumed run should start with
    pub next_epoch: usize,

    /// Best validation accuracy seen so far
    pub best_acc: f64,
}

/// SHA-256 digest over the flattened parameter data of both state dicts
fn content_digest(model: &FlatState, optimizer: &FlatState) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytemuck::cast_slice::<f32, u8>(&model.data));
    hasher.update(bytemuck::cast_slice::<f32, u8>(&optimizer.data));
    let result = hasher.finalize();
    format!("sha256-{}", hex::encode(&result[..16]))
}
