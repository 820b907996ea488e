use crate::message::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State variables of an atomic model, keyed by name.
///
/// Only the owning model's callbacks ever receive a mutable reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    variables: BTreeMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Numeric view of a variable, `None` if absent or not a number.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Integer view of a variable, `None` if absent or not an unsigned integer.
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Set a variable, returning its previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.variables.iter()
    }

    /// Variables whose value differs from `previous`, in name order.
    ///
    /// Removed variables are reported with a `Null` value.
    pub fn changes_since(&self, previous: &State) -> Vec<(String, Value)> {
        let mut changes: Vec<(String, Value)> = self
            .variables
            .iter()
            .filter(|(name, value)| previous.get(name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for name in previous.variables.keys() {
            if !self.variables.contains_key(name) {
                changes.push((name.clone(), Value::Null));
            }
        }
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        changes
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
