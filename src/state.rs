//! Named parameter state for checkpointing
//!
//! Models and optimizers exchange their parameters with the checkpoint
//! layer as a [`StateDict`]: an ordered map of parameter names to flat
//! value vectors. The [`Stateful`] trait is the seam to caller-owned
//! types; this crate never owns the training objects themselves.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ordered named parameter vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDict {
    entries: Vec<(String, Array1<f32>)>,
}

impl StateDict {
    /// Create an empty state dict
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state dict from existing entries
    pub fn from_entries(entries: Vec<(String, Array1<f32>)>) -> Self {
        Self { entries }
    }

    /// Insert a parameter, replacing any existing entry of the same name
    pub fn insert(&mut self, name: impl Into<String>, values: Array1<f32>) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = values;
        } else {
            self.entries.push((name, values));
        }
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&Array1<f32>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get a parameter by name, requiring an exact length
    ///
    /// This is the lookup `load_state_dict` implementations should use:
    /// a missing name or a length disagreement is a typed error, never a
    /// silent partial load.
    pub fn expect(&self, name: &str, len: usize) -> Result<&Array1<f32>> {
        let values = self
            .get(name)
            .ok_or_else(|| Error::StateMismatch(format!("missing parameter {name}")))?;
        if values.len() != len {
            return Err(Error::StateMismatch(format!(
                "parameter {name}: expected {len} values, got {}",
                values.len()
            )));
        }
        Ok(values)
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[(String, Array1<f32>)] {
        &self.entries
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the state dict holds no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of values across all parameters
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }

    /// Convert to the serializable flattened form
    pub fn to_flat(&self) -> FlatState {
        let mut data = Vec::with_capacity(self.value_count());
        let parameters = self
            .entries
            .iter()
            .map(|(name, values)| {
                data.extend(values.iter().copied());
                ParameterInfo {
                    name: name.clone(),
                    len: values.len(),
                }
            })
            .collect();

        FlatState { parameters, data }
    }

    /// Rebuild a state dict from its flattened form
    pub fn from_flat(flat: &FlatState) -> Result<Self> {
        let expected: usize = flat.parameters.iter().map(|p| p.len).sum();
        if expected != flat.data.len() {
            return Err(Error::StateMismatch(format!(
                "flattened state declares {expected} values but carries {}",
                flat.data.len()
            )));
        }

        let mut offset = 0;
        let entries = flat
            .parameters
            .iter()
            .map(|info| {
                let values = flat.data[offset..offset + info.len].to_vec();
                offset += info.len;
                (info.name.clone(), Array1::from(values))
            })
            .collect();

        Ok(Self { entries })
    }
}

/// Information about one parameter in a flattened state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (e.g. "layer1.weight")
    pub name: String,

    /// Number of values
    pub len: usize,
}

/// Serializable flattened form of a [`StateDict`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatState {
    /// Per-parameter layout
    pub parameters: Vec<ParameterInfo>,

    /// All parameter values, concatenated in declaration order
    pub data: Vec<f32>,
}

/// Seam between the checkpoint layer and caller-owned training objects
pub trait Stateful {
    /// Snapshot the current parameters
    fn state_dict(&self) -> StateDict;

    /// Restore parameters from a snapshot
    ///
    /// Implementations must reject name or length disagreements (see
    /// [`StateDict::expect`]).
    fn load_state_dict(&mut self, state: &StateDict) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StateDict {
        let mut sd = StateDict::new();
        sd.insert("weight", Array1::from(vec![1.0, 2.0, 3.0]));
        sd.insert("bias", Array1::from(vec![0.1]));
        sd
    }

    #[test]
    fn test_insert_and_get() {
        let sd = sample();
        assert_eq!(sd.len(), 2);
        assert_eq!(sd.get("weight").unwrap().len(), 3);
        assert!(sd.get("missing").is_none());
        assert_eq!(sd.names().collect::<Vec<_>>(), vec!["weight", "bias"]);
        assert_eq!(sd.value_count(), 4);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut sd = sample();
        sd.insert("bias", Array1::from(vec![9.0]));
        assert_eq!(sd.len(), 2);
        assert_eq!(sd.get("bias").unwrap()[0], 9.0);
    }

    #[test]
    fn test_expect_validates_name_and_len() {
        let sd = sample();
        assert!(sd.expect("weight", 3).is_ok());
        assert!(matches!(
            sd.expect("weight", 2),
            Err(Error::StateMismatch(_))
        ));
        assert!(matches!(
            sd.expect("missing", 1),
            Err(Error::StateMismatch(_))
        ));
    }

    #[test]
    fn test_flat_round_trip() {
        let sd = sample();
        let flat = sd.to_flat();
        assert_eq!(flat.data, vec![1.0, 2.0, 3.0, 0.1]);

        let restored = StateDict::from_flat(&flat).unwrap();
        assert_eq!(restored, sd);
    }

    #[test]
    fn test_from_flat_rejects_length_mismatch() {
        let mut flat = sample().to_flat();
        flat.data.pop();
        assert!(matches!(
            StateDict::from_flat(&flat),
            Err(Error::StateMismatch(_))
        ));
    }

    #[test]
    fn test_empty_state_dict() {
        let sd = StateDict::new();
        assert!(sd.is_empty());
        let flat = sd.to_flat();
        assert!(flat.parameters.is_empty());
        assert_eq!(StateDict::from_flat(&flat).unwrap(), sd);
    }
}
