use crate::message::Value;
use serde::{Deserialize, Serialize};

fn default_count() -> usize {
    1
}

/// Static description of a submodel to instantiate.
///
/// `module` and `class` identify the model type in a
/// [`ModelRegistry`](crate::registry::ModelRegistry); `init` is handed to its
/// factory. A `count` above one replicates the model into `name:0 … name:(count-1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub module: String,
    pub class: String,
    pub name: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub init: Value,
}

impl ModelDescriptor {
    pub fn new(
        module: impl Into<String>,
        class: impl Into<String>,
        name: impl Into<String>,
        count: usize,
        init: Value,
    ) -> Self {
        Self {
            module: module.into(),
            class: class.into(),
            name: name.into(),
            count,
            init,
        }
    }

    /// A descriptor for exactly one instance.
    pub fn single(
        module: impl Into<String>,
        class: impl Into<String>,
        name: impl Into<String>,
        init: Value,
    ) -> Self {
        Self::new(module, class, name, 1, init)
    }

    /// Names of the instances this descriptor expands to.
    pub fn instance_names(&self) -> Vec<String> {
        if self.count > 1 {
            (0..self.count)
                .map(|i| format!("{}:{}", self.name, i))
                .collect()
        } else {
            vec![self.name.clone()]
        }
    }
}
