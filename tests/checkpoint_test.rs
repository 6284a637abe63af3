//! Integration tests for the checkpoint save/resume cycle

use experimento::checkpoint::{
    load_best_model, load_checkpoint, save_checkpoint, save_model, BEST_MODEL_FILE,
};
use experimento::{append_metric, read_metric, Checkpoint, Experiment, StateDict, Stateful};
use ndarray::Array1;

#[derive(Debug, Clone, PartialEq)]
struct LinearModel {
    weight: Array1<f32>,
    bias: Array1<f32>,
}

impl LinearModel {
    fn new(weight: Vec<f32>, bias: Vec<f32>) -> Self {
        Self {
            weight: Array1::from(weight),
            bias: Array1::from(bias),
        }
    }

    fn zeros_like(&self) -> Self {
        Self {
            weight: Array1::zeros(self.weight.len()),
            bias: Array1::zeros(self.bias.len()),
        }
    }
}

impl Stateful for LinearModel {
    fn state_dict(&self) -> StateDict {
        let mut sd = StateDict::new();
        sd.insert("weight", self.weight.clone());
        sd.insert("bias", self.bias.clone());
        sd
    }

    fn load_state_dict(&mut self, state: &StateDict) -> experimento::Result<()> {
        self.weight = state.expect("weight", self.weight.len())?.clone();
        self.bias = state.expect("bias", self.bias.len())?.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MomentumState {
    velocity: Array1<f32>,
}

impl Stateful for MomentumState {
    fn state_dict(&self) -> StateDict {
        let mut sd = StateDict::new();
        sd.insert("velocity", self.velocity.clone());
        sd
    }

    fn load_state_dict(&mut self, state: &StateDict) -> experimento::Result<()> {
        self.velocity = state.expect("velocity", self.velocity.len())?.clone();
        Ok(())
    }
}

#[test]
fn test_stateful_trait_objects() {
    fn assert_stateful<S: Stateful>() {}
    assert_stateful::<LinearModel>();
    assert_stateful::<MomentumState>();
}

#[test]
fn test_full_training_resume_cycle() {
    let tmp = tempfile::tempdir().unwrap();
    let exp = Experiment::with_root("cycle", tmp.path());

    // A few epochs of "training"
    let model = LinearModel::new(vec![0.25, -0.5, 1.75, 2.0], vec![0.01]);
    let optimizer = MomentumState {
        velocity: Array1::from(vec![0.9, 0.85, 0.8, 0.75]),
    };
    for epoch in 0..5 {
        append_metric(&exp, "loss", epoch, 1.0 / (epoch as f64 + 1.0)).unwrap();
        append_metric(&exp, "accuracy", epoch, 0.6 + 0.05 * epoch as f64).unwrap();
    }

    let ckpt = Checkpoint::capture(5, 0.8, &model, &optimizer);
    save_checkpoint(&exp, &ckpt).unwrap();

    // "New process": fresh objects, restore everything
    let mut resumed_model = model.zeros_like();
    let mut resumed_optimizer = MomentumState {
        velocity: Array1::zeros(4),
    };
    let resume = load_checkpoint(&exp, &mut resumed_model, &mut resumed_optimizer).unwrap();

    assert_eq!(resume.next_epoch, 5);
    assert!((resume.best_acc - 0.8).abs() < f64::EPSILON);
    assert_eq!(resumed_model, model);
    assert_eq!(resumed_optimizer, optimizer);

    // The metric series survived alongside the checkpoint
    let loss = read_metric(&exp, "loss").unwrap();
    assert_eq!(loss.len(), 5);

    // ... and keeps growing after the resume
    append_metric(&exp, "loss", resume.next_epoch, 0.15).unwrap();
    assert_eq!(read_metric(&exp, "loss").unwrap().len(), 6);
}

#[test]
fn test_best_model_flow() {
    let tmp = tempfile::tempdir().unwrap();
    let exp = Experiment::with_root("best-flow", tmp.path());

    let mut best_acc = 0.0;
    let mut model = LinearModel::new(vec![0.0, 0.0], vec![0.0]);

    // Simulated epochs; the best epoch writes the best-model file
    for (epoch, acc) in [(0usize, 0.5), (1, 0.9), (2, 0.7)] {
        model.weight = Array1::from(vec![epoch as f32, acc as f32]);
        if acc > best_acc {
            best_acc = acc;
            save_model(&model, &exp, BEST_MODEL_FILE).unwrap();
        }
    }

    let mut best = LinearModel::new(vec![0.0, 0.0], vec![0.0]);
    load_best_model(&exp, &mut best).unwrap();

    // Epoch 1 scored highest
    assert_eq!(best.weight, Array1::from(vec![1.0_f32, 0.9]));
}

#[test]
fn test_checkpoint_coexists_with_custom_model_files() {
    let tmp = tempfile::tempdir().unwrap();
    let exp = Experiment::with_root("layout", tmp.path());

    let model = LinearModel::new(vec![1.0], vec![2.0]);
    let optimizer = MomentumState {
        velocity: Array1::from(vec![0.5]),
    };

    save_checkpoint(&exp, &Checkpoint::capture(1, 0.1, &model, &optimizer)).unwrap();
    save_model(&model, &exp, "epoch_001.safetensors").unwrap();
    save_model(&model, &exp, BEST_MODEL_FILE).unwrap();

    // Everything lives under root/<id>/
    assert!(exp.file_path("checkpoint.json").exists());
    assert!(exp.file_path("epoch_001.safetensors").exists());
    assert!(exp.file_path(BEST_MODEL_FILE).exists());
}

#[test]
fn test_load_into_wrong_architecture_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let exp = Experiment::with_root("wrong-arch", tmp.path());

    let model = LinearModel::new(vec![1.0, 2.0], vec![0.5]);
    save_model(&model, &exp, BEST_MODEL_FILE).unwrap();

    // Different weight length must be rejected
    let mut other = LinearModel::new(vec![0.0, 0.0, 0.0], vec![0.0]);
    assert!(load_best_model(&exp, &mut other).is_err());
}
