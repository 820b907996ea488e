//! Registry of model types.
//!
//! Submodels are declared by `(module, class)` reference; the registry maps
//! each reference to a factory building the model from its name and initial
//! parameter.

use crate::atomic::{AtomicModel, Behaviour};
use crate::coupled::{CoupledBehaviour, CoupledModel, CoupledSpec};
use crate::descriptor::ModelDescriptor;
use crate::errors::{DevsError, DevsResult};
use crate::message::Value;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;

/// Module under which the kernel's own model types are registered.
pub const KERNEL_MODULE: &str = "cdevs";

/// A model node: either an atomic or a coupled model.
#[derive(Debug)]
pub enum Model {
    Atomic(AtomicModel),
    Coupled(CoupledModel),
}

impl Model {
    pub fn name(&self) -> &str {
        match self {
            Model::Atomic(model) => model.name(),
            Model::Coupled(model) => model.name(),
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Model::Atomic(_))
    }
}

impl From<AtomicModel> for Model {
    fn from(value: AtomicModel) -> Self {
        Model::Atomic(value)
    }
}

impl From<CoupledModel> for Model {
    fn from(value: CoupledModel) -> Self {
        Model::Coupled(value)
    }
}

/// Builds a model from its instance name and initial parameter.
pub type ModelFactory = Box<dyn Fn(&str, &Value) -> DevsResult<Model> + Send + Sync>;

/// Decode the initial parameter of instance `name` of `module.class`.
pub fn decode_parameter<T: DeserializeOwned>(
    module: &str,
    class: &str,
    name: &str,
    init: &Value,
) -> DevsResult<T> {
    // A missing parameter decodes like an empty table so all-default types work.
    let init = match init {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(init).map_err(|e| DevsError::InvalidParameter {
        module: module.to_string(),
        class: class.to_string(),
        name: name.to_string(),
        details: e.to_string(),
    })
}

pub struct ModelRegistry {
    factories: HashMap<(String, String), ModelFactory>,
}

impl ModelRegistry {
    /// A registry holding only the data-driven [`CoupledSpec`].
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_coupled::<CoupledSpec>(KERNEL_MODULE, "CoupledSpec");
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register an arbitrary factory, replacing any previous one for the same reference.
    pub fn register<F>(&mut self, module: impl Into<String>, class: impl Into<String>, factory: F)
    where
        F: Fn(&str, &Value) -> DevsResult<Model> + Send + Sync + 'static,
    {
        let key = (module.into(), class.into());
        if self.factories.insert(key.clone(), Box::new(factory)).is_some() {
            log::debug!("Replaced model factory for {}.{}", key.0, key.1);
        }
    }

    /// Register an atomic behaviour decoded from the initial parameter.
    pub fn register_atomic<B>(&mut self, module: impl Into<String>, class: impl Into<String>)
    where
        B: Behaviour + DeserializeOwned + 'static,
    {
        let module = module.into();
        let class = class.into();
        let (m, c) = (module.clone(), class.clone());
        self.register(module, class, move |name, init| {
            let behaviour: B = decode_parameter(&m, &c, name, init)?;
            Ok(Model::Atomic(AtomicModel::from_behaviour(name, behaviour)))
        });
    }

    /// Register a coupled behaviour decoded from the initial parameter.
    pub fn register_coupled<C>(&mut self, module: impl Into<String>, class: impl Into<String>)
    where
        C: CoupledBehaviour + DeserializeOwned + 'static,
    {
        let module = module.into();
        let class = class.into();
        let (m, c) = (module.clone(), class.clone());
        self.register(module, class, move |name, init| {
            let behaviour: C = decode_parameter(&m, &c, name, init)?;
            Ok(Model::Coupled(CoupledModel::from_behaviour(name, behaviour)))
        });
    }

    pub fn contains(&self, module: &str, class: &str) -> bool {
        self.factories
            .contains_key(&(module.to_string(), class.to_string()))
    }

    /// Instantiate a model under `name`.
    pub fn instantiate(&self, descriptor: &ModelDescriptor, name: &str) -> DevsResult<Model> {
        let factory = self
            .factories
            .get(&(descriptor.module.clone(), descriptor.class.clone()))
            .ok_or_else(|| DevsError::UnknownModelType {
                module: descriptor.module.clone(),
                class: descriptor.class.clone(),
            })?;
        factory(name, &descriptor.init)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .factories
            .keys()
            .map(|(module, class)| format!("{module}.{class}"))
            .collect();
        keys.sort();
        f.debug_struct("ModelRegistry").field("types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::DispatchTable;
    use crate::time::INFINITY;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Idle {
        #[serde(default)]
        label: String,
    }

    #[typetag::serde]
    impl Behaviour for Idle {
        fn dispatch_table(&self) -> DispatchTable {
            DispatchTable::new().on_time_advance("init", |_| INFINITY)
        }
    }

    #[test]
    fn test_coupled_spec_is_preregistered() {
        let registry = ModelRegistry::new();
        assert!(registry.contains(KERNEL_MODULE, "CoupledSpec"));
        assert!(!ModelRegistry::empty().contains(KERNEL_MODULE, "CoupledSpec"));
    }

    #[test]
    fn test_instantiate_atomic() {
        let mut registry = ModelRegistry::new();
        registry.register_atomic::<Idle>("test", "Idle");

        let model = registry
            .instantiate(
                &ModelDescriptor::single("test", "Idle", "idle", json!({"label": "x"})),
                "idle:3",
            )
            .unwrap();
        assert!(model.is_atomic());
        assert_eq!(model.name(), "idle:3");

        // Null parameters fall back to defaults.
        let model = registry
            .instantiate(&ModelDescriptor::single("test", "Idle", "idle", Value::Null), "idle")
            .unwrap();
        assert_eq!(model.name(), "idle");
    }

    #[test]
    fn test_unknown_type() {
        let registry = ModelRegistry::new();
        let err = registry
            .instantiate(&ModelDescriptor::single("nope", "Missing", "x", Value::Null), "x")
            .unwrap_err();
        assert!(matches!(
            err,
            DevsError::UnknownModelType { module, class } if module == "nope" && class == "Missing"
        ));
    }

    #[test]
    fn test_invalid_parameter() {
        let mut registry = ModelRegistry::new();
        registry.register_atomic::<Idle>("test", "Idle");
        let err = registry
            .instantiate(
                &ModelDescriptor::single("test", "Idle", "idle", json!({"label": 3})),
                "idle",
            )
            .unwrap_err();
        match err {
            DevsError::InvalidParameter { name, class, .. } => {
                assert_eq!(name, "idle");
                assert_eq!(class, "Idle");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_custom_factory() {
        let mut registry = ModelRegistry::empty();
        registry.register("test", "Fixed", |name, _| {
            Ok(Model::Atomic(AtomicModel::from_behaviour(
                name,
                Idle {
                    label: "fixed".to_string(),
                },
            )))
        });
        let model = registry
            .instantiate(&ModelDescriptor::single("test", "Fixed", "f", Value::Null), "f")
            .unwrap();
        assert_eq!(model.name(), "f");
    }
}
