use crate::atomic::{Behaviour, DispatchTable, ExternalOutcome, State};
use crate::coupled::{CoupledSpec, CouplingDecl, SelectRuleDecl};
use crate::descriptor::ModelDescriptor;
use crate::message::{Message, Value};
use crate::registry::{ModelRegistry, KERNEL_MODULE};
use crate::time::{Time, INFINITY};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub(crate) const TEST_MODULE: &str = "test";

/// Emits an incrementing counter on `pulse` every `period`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Pulse {
    pub period: Time,
}

#[typetag::serde]
impl Behaviour for Pulse {
    fn dispatch_table(&self) -> DispatchTable {
        let period = self.period;
        DispatchTable::new()
            .on_time_advance("init", |_| 0.0)
            .silent("init")
            .on_internal("init", |_| "active")
            .on_time_advance("active", move |_| period)
            .on_output("active", |state| {
                Some(Message::new("pulse", json!(state.get_u64("count"))))
            })
            .on_internal("active", |state| {
                let count = state.get_u64("count").unwrap_or(0);
                state.set("count", count + 1);
                "active"
            })
    }

    fn initial_state(&self) -> State {
        [("count", 0)].into_iter().collect()
    }
}

/// Takes one input at a time and hands it back after `service_time`.
///
/// Inputs arriving while busy are counted in `missed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Collector {
    pub service_time: Time,
}

#[typetag::serde]
impl Behaviour for Collector {
    fn dispatch_table(&self) -> DispatchTable {
        let service_time = self.service_time;
        DispatchTable::new()
            .on_time_advance("idle", |_| INFINITY)
            .on_external("idle", |state, _, input| {
                state.set("job", input.value.clone());
                ExternalOutcome::enter("busy")
            })
            .on_time_advance("busy", move |_| service_time)
            .on_output("busy", |state| {
                state.get("job").map(|job| Message::new("done", job.clone()))
            })
            .on_internal("busy", |_| "idle")
            .on_external("busy", |state, _, _| {
                let missed = state.get_u64("missed").unwrap_or(0);
                state.set("missed", missed + 1);
                ExternalOutcome::Continue
            })
            // Leaves `init` at once.
            .on_time_advance("init", |_| 0.0)
            .silent("init")
            .on_internal("init", |_| "idle")
    }

    fn initial_state(&self) -> State {
        [("missed", 0)].into_iter().collect()
    }
}

/// Enters a phase it has no time advance for after one time unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Stubborn {}

#[typetag::serde]
impl Behaviour for Stubborn {
    fn dispatch_table(&self) -> DispatchTable {
        DispatchTable::new()
            .on_time_advance("init", |_| 1.0)
            .silent("init")
            .on_internal("init", |_| "foo")
    }
}

pub(crate) fn test_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.register_atomic::<Pulse>(TEST_MODULE, "Pulse");
    registry.register_atomic::<Collector>(TEST_MODULE, "Collector");
    registry.register_atomic::<Stubborn>(TEST_MODULE, "Stubborn");
    registry
}

pub(crate) fn atomic(class: &str, name: &str, count: usize, init: Value) -> ModelDescriptor {
    ModelDescriptor::new(TEST_MODULE, class, name, count, init)
}

pub(crate) fn coupled(name: &str, spec: &CoupledSpec) -> ModelDescriptor {
    ModelDescriptor::single(
        KERNEL_MODULE,
        "CoupledSpec",
        name,
        serde_json::to_value(spec).unwrap(),
    )
}

/// Two pulses feeding a collector whose output leaves the model.
pub(crate) fn pulse_collector(select: Vec<SelectRuleDecl>) -> CoupledSpec {
    CoupledSpec {
        submodels: vec![
            atomic("Pulse", "gen", 2, json!({"period": 2.0})),
            atomic("Collector", "proc", 1, json!({"service_time": 3.0})),
        ],
        couplings: vec![
            CouplingDecl::new("gen[0:2]", ["proc"]),
            CouplingDecl::new("proc", ["self"]),
        ],
        select,
    }
}

pub(crate) fn default_rules() -> Vec<SelectRuleDecl> {
    vec![
        SelectRuleDecl::new(["gen.*"], "gen:0"),
        SelectRuleDecl::new(["proc", ".*"], "proc"),
        SelectRuleDecl::new([".*"], ".*"),
    ]
}
