//! Generators feeding a processor
//!
//! `gen` (replicated `generators` times) sends its jobs to `proc`, whose
//! output leaves the coupled model. The processor goes first when it is
//! imminent together with generators; among generators alone, the lexically
//! first name goes first, so `gen:0` whenever it is imminent.

use cdevs_core::coupled::{CoupledBehaviour, CouplingDecl, SelectRuleDecl, SELF_ENDPOINT};
use cdevs_core::descriptor::ModelDescriptor;
use cdevs_core::time::Time;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::generator::GENERATOR_CLASS;
use super::processor::PROCESSOR_CLASS;
use super::{GENERATOR_MODULE, PROCESSOR_MODULE};

pub const GENERATOR_PROCESSOR_CLASS: &str = "GeneratorProcessor";

fn default_generators() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorProcessor {
    pub period: Time,
    pub service_time: Time,
    #[serde(default = "default_generators")]
    pub generators: usize,
}

impl GeneratorProcessor {
    pub fn new(period: Time, service_time: Time, generators: usize) -> Self {
        Self {
            period,
            service_time,
            generators,
        }
    }

    fn generator_endpoint(&self) -> String {
        if self.generators > 1 {
            format!("gen[0:{}]", self.generators)
        } else {
            "gen".to_string()
        }
    }
}

#[typetag::serde]
impl CoupledBehaviour for GeneratorProcessor {
    fn submodels(&self) -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::new(
                GENERATOR_MODULE,
                GENERATOR_CLASS,
                "gen",
                self.generators,
                json!({"period": self.period}),
            ),
            ModelDescriptor::single(
                PROCESSOR_MODULE,
                PROCESSOR_CLASS,
                "proc",
                json!({"service_time": self.service_time}),
            ),
        ]
    }

    fn couplings(&self) -> Vec<CouplingDecl> {
        vec![
            CouplingDecl::new(self.generator_endpoint(), ["proc"]),
            CouplingDecl::new("proc", [SELF_ENDPOINT]),
        ]
    }

    fn select_rules(&self) -> Vec<SelectRuleDecl> {
        vec![
            SelectRuleDecl::new(["proc", ".*"], "proc"),
            SelectRuleDecl::new([".*"], ".*"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdevs_core::coupled::{CoupledModel, CouplingClass};

    #[test]
    fn resolves_replicated_generators() {
        let model = CoupledModel::from_behaviour("top", GeneratorProcessor::new(2.0, 3.0, 3));
        let structure = model.resolve("/top", true).unwrap();

        assert_eq!(
            structure.instance_names(),
            vec!["gen:0", "gen:1", "gen:2", "proc"]
        );
        assert_eq!(structure.routing.count(CouplingClass::Internal), 3);
        assert_eq!(structure.routing.count(CouplingClass::ExternalOutput), 1);
        assert_eq!(structure.select.resolve(&["gen:2", "gen:1"]), Ok("gen:1"));
        assert_eq!(structure.select.resolve(&["gen:2", "proc"]), Ok("proc"));
        assert_eq!(structure.select.resolve(&["gen:2", "gen:0"]), Ok("gen:0"));
    }

    #[test]
    fn single_generator_keeps_bare_name() {
        let model = CoupledModel::from_behaviour("top", GeneratorProcessor::new(2.0, 3.0, 1));
        let structure = model.resolve("/top", true).unwrap();

        assert_eq!(structure.instance_names(), vec!["gen", "proc"]);
        assert_eq!(structure.routing.destinations("gen"), vec!["proc"]);
        assert_eq!(structure.select.resolve(&["gen", "proc"]), Ok("proc"));
    }
}
