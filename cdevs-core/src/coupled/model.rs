use super::endpoint::{EndpointRef, SELF_ENDPOINT};
use super::routing::{CouplingDecl, RoutingTable};
use super::select::{SelectResolver, SelectRuleDecl};
use crate::descriptor::ModelDescriptor;
use crate::errors::{DevsError, DevsResult, SpecificationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

/// Structure of a coupled model variant.
///
/// Implementors describe their submodels, the couplings between them and the
/// rules used to break ties. Nothing is validated here; see
/// [`CoupledModel::resolve`].
#[typetag::serde(tag = "type")]
pub trait CoupledBehaviour: Debug {
    fn submodels(&self) -> Vec<ModelDescriptor>;
    fn couplings(&self) -> Vec<CouplingDecl>;
    fn select_rules(&self) -> Vec<SelectRuleDecl>;
}

/// A coupled model declared purely as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoupledSpec {
    pub submodels: Vec<ModelDescriptor>,
    #[serde(default)]
    pub couplings: Vec<CouplingDecl>,
    #[serde(default)]
    pub select: Vec<SelectRuleDecl>,
}

#[typetag::serde]
impl CoupledBehaviour for CoupledSpec {
    fn submodels(&self) -> Vec<ModelDescriptor> {
        self.submodels.clone()
    }

    fn couplings(&self) -> Vec<CouplingDecl> {
        self.couplings.clone()
    }

    fn select_rules(&self) -> Vec<SelectRuleDecl> {
        self.select.clone()
    }
}

/// One concrete submodel after replication.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub name: String,
    pub descriptor: ModelDescriptor,
}

/// The validated structure of a coupled model, ready to be simulated.
#[derive(Debug, Clone)]
pub struct CoupledStructure {
    pub instances: Vec<Instance>,
    pub routing: RoutingTable,
    pub select: SelectResolver,
}

impl CoupledStructure {
    pub fn instance_names(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.name.clone()).collect()
    }
}

/// A coupled model instance, not yet resolved.
#[derive(Debug)]
pub struct CoupledModel {
    name: String,
    behaviour: Box<dyn CoupledBehaviour>,
}

impl CoupledModel {
    pub fn new(name: impl Into<String>, behaviour: Box<dyn CoupledBehaviour>) -> Self {
        Self {
            name: name.into(),
            behaviour,
        }
    }

    pub fn from_behaviour<C: CoupledBehaviour + 'static>(
        name: impl Into<String>,
        behaviour: C,
    ) -> Self {
        Self::new(name, Box::new(behaviour))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behaviour(&self) -> &dyn CoupledBehaviour {
        self.behaviour.as_ref()
    }

    /// Replicate submodels, expand couplings and compile select rules.
    ///
    /// `path` is only used to label errors and warnings. With `strict_select`
    /// a conflict set no rule resolves is an error instead of a warning.
    pub fn resolve(&self, path: &str, strict_select: bool) -> DevsResult<CoupledStructure> {
        let fail = |kind| DevsError::specification(path, kind);

        let descriptors = self.behaviour.submodels();
        if descriptors.is_empty() {
            return Err(fail(SpecificationError::NoSubmodels));
        }

        let mut seen = HashSet::new();
        let mut instances = vec![];
        for descriptor in &descriptors {
            for name in descriptor.instance_names() {
                if name != SELF_ENDPOINT && !is_addressable(&name) {
                    return Err(fail(SpecificationError::InvalidInstanceName(name)));
                }
                if name == SELF_ENDPOINT || !seen.insert(name.clone()) {
                    return Err(fail(SpecificationError::DuplicateInstance(name)));
                }
                instances.push(Instance {
                    name,
                    descriptor: descriptor.clone(),
                });
            }
        }
        let names: Vec<String> = instances.iter().map(|i| i.name.clone()).collect();

        let routing = RoutingTable::resolve(&names, &self.behaviour.couplings()).map_err(fail)?;
        let select = SelectResolver::compile(&self.behaviour.select_rules()).map_err(fail)?;

        if let Some(winner) = select.unreachable_winners(&names).first() {
            return Err(fail(SpecificationError::UnreachableWinner(
                winner.to_string(),
            )));
        }
        for pattern in select.unused_candidates(&names) {
            log::warn!("{path}: select pattern '{pattern}' matches no submodel");
        }

        match select.uncovered_conflicts(&names) {
            Some(uncovered) => {
                if let Some(first) = uncovered.first() {
                    if strict_select {
                        return Err(fail(SpecificationError::IncompleteSelect(first.clone())));
                    }
                    log::warn!(
                        "{path}: {} conflict set(s) are not covered by any select rule, e.g. {:?}",
                        uncovered.len(),
                        first
                    );
                }
            }
            None => log::debug!(
                "{path}: {} instances, skipping select coverage check",
                names.len()
            ),
        }

        log::debug!(
            "{path}: resolved {} instances and {} couplings",
            instances.len(),
            routing.len()
        );
        Ok(CoupledStructure {
            instances,
            routing,
            select,
        })
    }
}

/// Whether couplings can name `name` as a single endpoint.
fn is_addressable(name: &str) -> bool {
    matches!(EndpointRef::parse(name), Ok(EndpointRef::Instance(parsed)) if parsed == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn procgen() -> CoupledSpec {
        CoupledSpec {
            submodels: vec![
                ModelDescriptor::new("generator", "Generator", "gen", 2, json!({"period": 2.0})),
                ModelDescriptor::single("processor", "Processor", "proc", json!({"service_time": 3.0})),
            ],
            couplings: vec![
                CouplingDecl::new("gen[0:2]", ["proc"]),
                CouplingDecl::new("proc", ["self"]),
            ],
            select: vec![
                SelectRuleDecl::new(["gen.*"], "gen:0"),
                SelectRuleDecl::new(["proc", ".*"], "proc"),
                SelectRuleDecl::new([".*"], ".*"),
            ],
        }
    }

    fn kind(err: DevsError) -> SpecificationError {
        match err {
            DevsError::Specification { kind, .. } => kind,
            other => panic!("expected a specification error, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_procgen() {
        let model = CoupledModel::from_behaviour("top", procgen());
        let structure = model.resolve("/top", true).unwrap();

        assert_eq!(structure.instance_names(), vec!["gen:0", "gen:1", "proc"]);
        assert_eq!(structure.instances[1].descriptor.name, "gen");
        assert_eq!(structure.routing.destinations("gen:0"), vec!["proc"]);
        assert_eq!(structure.routing.destinations("proc"), vec!["self"]);
        assert_eq!(structure.select.rules().len(), 3);
    }

    #[test]
    fn test_duplicate_instances() {
        let mut spec = procgen();
        spec.submodels
            .push(ModelDescriptor::single("generator", "Generator", "gen:1", json!(null)));
        let err = CoupledModel::from_behaviour("top", spec)
            .resolve("/top", false)
            .unwrap_err();
        assert_eq!(
            kind(err),
            SpecificationError::DuplicateInstance("gen:1".to_string())
        );
    }

    #[test]
    fn test_rejects_names_couplings_cannot_reach() {
        let mut spec = procgen();
        spec.submodels[1].name = "my-proc".to_string();
        let err = CoupledModel::from_behaviour("top", spec)
            .resolve("/top", false)
            .unwrap_err();
        assert_eq!(
            kind(err),
            SpecificationError::InvalidInstanceName("my-proc".to_string())
        );
    }

    #[test]
    fn test_no_submodels() {
        let err = CoupledModel::from_behaviour("top", CoupledSpec::default())
            .resolve("/top", false)
            .unwrap_err();
        assert_eq!(kind(err), SpecificationError::NoSubmodels);
    }

    #[test]
    fn test_unreachable_winner() {
        let mut spec = procgen();
        spec.select.push(SelectRuleDecl::new([".*"], "sink"));
        let err = CoupledModel::from_behaviour("top", spec)
            .resolve("/top", false)
            .unwrap_err();
        assert_eq!(
            kind(err),
            SpecificationError::UnreachableWinner("sink".to_string())
        );
    }

    #[test]
    fn test_incomplete_select_only_fails_when_strict() {
        let mut spec = procgen();
        spec.select.truncate(1);
        let model = CoupledModel::from_behaviour("top", spec);

        assert!(model.resolve("/top", false).is_ok());
        let err = model.resolve("/top", true).unwrap_err();
        assert_eq!(
            kind(err),
            SpecificationError::IncompleteSelect(vec!["gen:0".to_string(), "proc".to_string()])
        );
    }

    #[test]
    fn test_error_names_the_model_path() {
        let mut spec = procgen();
        spec.couplings.push(CouplingDecl::new("gen[0:5]", ["proc"]));
        let err = CoupledModel::from_behaviour("top", spec)
            .resolve("/root/top", false)
            .unwrap_err();
        match err {
            DevsError::Specification { model, kind } => {
                assert_eq!(model, "/root/top");
                assert_eq!(kind, SpecificationError::UndeclaredEndpoint("gen:2".to_string()));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_coupled_spec_from_toml() {
        let spec: CoupledSpec = toml::from_str(
            r#"
[[submodels]]
module = "generator"
class = "Generator"
name = "gen"
count = 2
init = { period = 2.0 }

[[couplings]]
source = "gen[0:2]"
destinations = ["self"]

[[select]]
candidates = [".*"]
winner = "gen:1"
"#,
        )
        .unwrap();

        assert_eq!(spec.submodels[0].count, 2);
        assert_eq!(spec.submodels[0].init, json!({"period": 2.0}));
        assert_eq!(spec.couplings[0].destinations, vec!["self"]);
        assert_eq!(spec.select[0].winner, "gen:1");
    }
}
