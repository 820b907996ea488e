//! Single-slot job processor
//!
//! Accepts one job at a time and hands it back on port `job` after a fixed
//! service time. Jobs arriving while busy are counted in `missed` and
//! otherwise ignored.

use cdevs_core::atomic::{Behaviour, DispatchTable, ExternalOutcome, State};
use cdevs_core::message::Message;
use cdevs_core::time::{Time, INFINITY};
use serde::{Deserialize, Serialize};

use super::generator::JOB_PORT;

pub const PROCESSOR_CLASS: &str = "Processor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processor {
    /// unit: simulated time
    pub service_time: Time,
}

impl Processor {
    pub fn new(service_time: Time) -> Self {
        Self { service_time }
    }
}

#[typetag::serde]
impl Behaviour for Processor {
    fn dispatch_table(&self) -> DispatchTable {
        let service_time = self.service_time;
        DispatchTable::new()
            .on_time_advance("init", |_| 0.0)
            .silent("init")
            .on_internal("init", |_| "idle")
            .on_time_advance("idle", |_| INFINITY)
            .on_external("idle", |state, _, input| {
                state.set("job", input.value.clone());
                ExternalOutcome::enter("busy")
            })
            .on_time_advance("busy", move |_| service_time)
            .on_output("busy", |state| {
                state
                    .get("job")
                    .map(|job| Message::new(JOB_PORT, job.clone()))
            })
            .on_internal("busy", |_| "idle")
            .on_external("busy", |state, _, _| {
                let missed = state.get_u64("missed").unwrap_or(0);
                state.set("missed", missed + 1);
                ExternalOutcome::Continue
            })
    }

    fn initial_state(&self) -> State {
        [("missed", 0)].into_iter().collect()
    }
}
