//! Periodic job generator
//!
//! Emits a job on port `job` every `period`, starting one period after the
//! start of the simulation.

use cdevs_core::atomic::{Behaviour, DispatchTable, State};
use cdevs_core::message::Message;
use cdevs_core::time::Time;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const GENERATOR_CLASS: &str = "Generator";
pub const JOB_PORT: &str = "job";

/// Emits `{"job": <source>, "count": <n>}` every `period`.
///
/// `source` identifies the jobs of this generator; the registered factory
/// fills it with the instance name when it is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generator {
    /// unit: simulated time
    pub period: Time,
    #[serde(default)]
    pub source: Option<String>,
}

impl Generator {
    pub fn new(period: Time) -> Self {
        Self {
            period,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[typetag::serde]
impl Behaviour for Generator {
    fn dispatch_table(&self) -> DispatchTable {
        let period = self.period;
        let source = self.source.clone();
        DispatchTable::new()
            .on_time_advance("init", |_| 0.0)
            .silent("init")
            .on_internal("init", |_| "active")
            .on_time_advance("active", move |_| period)
            .on_output("active", move |state| {
                Some(Message::new(
                    JOB_PORT,
                    json!({"job": source, "count": state.get_u64("count").unwrap_or(0)}),
                ))
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
