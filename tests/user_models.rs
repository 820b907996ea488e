use cdevs::{
    register_components, Behaviour, DispatchTable, ExternalOutcome, Message, ModelRegistry,
    RootCoordinator, SimulationConfig, Time, INFINITY,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Takes a generator job and, `delay` later, emits twice its count.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Doubler {
    delay: Time,
}

#[typetag::serde]
impl Behaviour for Doubler {
    fn dispatch_table(&self) -> DispatchTable {
        let delay = self.delay;
        DispatchTable::new()
            .on_time_advance("init", |_| INFINITY)
            .on_external("init", |state, _, message| {
                let count = message.value["count"].as_u64().unwrap_or(0);
                state.set("value", count * 2);
                ExternalOutcome::enter("busy")
            })
            .on_time_advance("busy", move |_| delay)
            .on_output("busy", |state| {
                Some(Message::new("doubled", json!(state.get_u64("value"))))
            })
            .on_internal("busy", |_| "init")
    }
}

fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    register_components(&mut registry);
    registry.register_atomic::<Doubler>("user", "Doubler");
    registry
}

const CONFIG: &str = r#"
end_time = 4.0
strict_select = true

[root]
module = "cdevs"
class = "CoupledSpec"
name = "top"

[[root.init.submodels]]
module = "generator"
class = "Generator"
name = "gen"
init = { period = 1.0 }

[[root.init.submodels]]
module = "user"
class = "Doubler"
name = "dbl"
init = { delay = 1.0 }

[[root.init.couplings]]
source = "gen"
destinations = ["dbl"]

[[root.init.couplings]]
source = "dbl"
destinations = ["self"]

[[root.init.select]]
candidates = ["dbl", "gen"]
winner = "dbl"
"#;

#[test]
fn user_model_from_config() {
    let config = SimulationConfig::from_toml_str(CONFIG).unwrap();
    let mut rc = RootCoordinator::from_config(&config, &registry()).unwrap();
    rc.run().unwrap();

    // The doubler is imminent together with the generator from t=2 on and
    // empties itself before the next job arrives.
    let outputs: Vec<(Time, Message)> = rc
        .outputs()
        .iter()
        .map(|o| (o.time, o.message.clone()))
        .collect();
    assert_eq!(
        outputs,
        vec![
            (2.0, Message::new("doubled", json!(0))),
            (3.0, Message::new("doubled", json!(2))),
            (4.0, Message::new("doubled", json!(4))),
        ]
    );

    let dbl = rc.atomic("/top/dbl").unwrap();
    assert_eq!(dbl.phase(), "busy");
    assert_eq!(dbl.state().get_u64("value"), Some(6));
    assert_eq!(rc.time_next(), 5.0);
}

#[test]
fn unregistered_user_model_is_rejected() {
    let config = SimulationConfig::from_toml_str(CONFIG).unwrap();
    let mut registry = ModelRegistry::new();
    register_components(&mut registry);

    let err = RootCoordinator::from_config(&config, &registry).unwrap_err();
    assert!(err.to_string().contains("Doubler"));
}

#[test]
fn config_from_file() {
    let path = std::env::temp_dir().join(format!("cdevs-config-{}.toml", std::process::id()));
    std::fs::write(&path, CONFIG).unwrap();
    let config = SimulationConfig::from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.end_time, 4.0);
    assert_eq!(config.root.init["submodels"][1]["class"], json!("Doubler"));
    assert_eq!(config.root.init["select"][0]["winner"], json!("dbl"));
}

#[test]
fn restored_user_model_keeps_its_state() {
    let config = SimulationConfig::from_toml_str(CONFIG).unwrap();
    let mut rc = RootCoordinator::from_config(&config, &registry()).unwrap();
    rc.run().unwrap();

    let dbl = rc.atomic("/top/dbl").unwrap();
    let serialised = serde_json::to_string(dbl).unwrap();
    let restored: cdevs::AtomicModel = serde_json::from_str(&serialised).unwrap();
    assert_eq!(restored.phase(), dbl.phase());
    assert_eq!(restored.state(), dbl.state());
    assert_eq!(restored.path(), "/top/dbl");
    assert!(restored.dispatch_table().has_phase("busy"));
}
