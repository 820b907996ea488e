use super::dispatch::{DispatchTable, ExternalOutcome};
use super::phase::Phase;
use super::state::State;
use crate::context::Context;
use crate::errors::{DevsError, DevsResult, Operation};
use crate::message::{Message, Value};
use crate::time::Time;
use crate::trace::TraceKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

/// Behaviour of an atomic model variant.
///
/// Implementors hold the model parameters and build the phase dispatch table
/// from them. The table is rebuilt whenever a model is restored from its
/// serialised form, so handlers must only depend on the parameters.
#[typetag::serde(tag = "type")]
pub trait Behaviour: Debug {
    /// Callbacks for every phase the model may enter.
    fn dispatch_table(&self) -> DispatchTable;

    /// State variables the model starts with.
    fn initial_state(&self) -> State {
        State::new()
    }
}

/// An atomic model instance: a phase and state bundle driven by its dispatch table.
#[derive(Debug)]
pub struct AtomicModel {
    name: String,
    path: String,
    phase: Phase,
    state: State,
    behaviour: Box<dyn Behaviour>,
    table: DispatchTable,
}

impl AtomicModel {
    pub fn new(name: impl Into<String>, behaviour: Box<dyn Behaviour>) -> Self {
        let name = name.into();
        let table = behaviour.dispatch_table();
        let state = behaviour.initial_state();
        Self {
            path: format!("/{name}"),
            name,
            phase: Phase::init(),
            state,
            behaviour,
            table,
        }
    }

    pub fn from_behaviour<B: Behaviour + 'static>(name: impl Into<String>, behaviour: B) -> Self {
        Self::new(name, Box::new(behaviour))
    }

    /// Place the model below `parent_path` in the hierarchy.
    pub(crate) fn attach(&mut self, parent_path: &str) {
        self.path = format!("{}/{}", parent_path, self.name);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn behaviour(&self) -> &dyn Behaviour {
        self.behaviour.as_ref()
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.table
    }

    fn missing(&self, operation: Operation, time: Time) -> DevsError {
        DevsError::MissingCallback {
            model: self.path.clone(),
            phase: self.phase.to_string(),
            operation,
            time,
        }
    }

    fn snapshot_for_trace(&self, ctx: &Context) -> Option<State> {
        ctx.tracing(&self.path, TraceKind::State)
            .then(|| self.state.clone())
    }

    fn report_changes(&self, ctx: &mut Context, before: Option<State>) {
        let Some(before) = before else {
            return;
        };
        for (name, value) in self.state.changes_since(&before) {
            ctx.notify(&self.path, TraceKind::State, |event| {
                event
                    .with_phase(&self.phase)
                    .with_outcome(name)
                    .with_payload(value)
            });
        }
    }

    /// How long the model stays in its current phase absent external input.
    pub fn time_advance(&self, ctx: &mut Context) -> DevsResult<Time> {
        let handler = self
            .table
            .time_advance(self.phase.as_str())
            .ok_or_else(|| self.missing(Operation::TimeAdvance, ctx.now()))?;
        let duration = handler(&self.state);

        ctx.notify(&self.path, TraceKind::TimeAdvance, |event| {
            event
                .with_phase(&self.phase)
                .with_outcome(duration.to_string())
        });
        Ok(duration)
    }

    /// The value placed on output right before an internal transition.
    pub fn output(&self, ctx: &mut Context) -> DevsResult<Option<Message>> {
        let handler = self
            .table
            .output(self.phase.as_str())
            .ok_or_else(|| self.missing(Operation::Output, ctx.now()))?;
        let message = handler(&self.state);

        ctx.notify(&self.path, TraceKind::Output, |event| {
            let event = event.with_phase(&self.phase);
            match &message {
                Some(message) => event
                    .with_outcome(message.port.clone())
                    .with_payload(message.value.clone()),
                None => event.with_outcome("None"),
            }
        });
        Ok(message)
    }

    /// Compute the output, then apply the internal transition of the current phase.
    ///
    /// The output always sees the state from before the transition.
    pub fn internal_transition(&mut self, ctx: &mut Context) -> DevsResult<Option<Message>> {
        let message = self.output(ctx)?;

        let handler = self
            .table
            .internal(self.phase.as_str())
            .ok_or_else(|| self.missing(Operation::Internal, ctx.now()))?;
        let before = self.snapshot_for_trace(ctx);
        let next = handler(&mut self.state);

        ctx.notify(&self.path, TraceKind::Internal, |event| {
            event.with_phase(&self.phase).with_outcome(next.to_string())
        });
        self.phase = next;
        self.report_changes(ctx, before);
        Ok(message)
    }

    /// Apply the external transition of the current phase to `input`.
    ///
    /// Returns `true` when the model entered a (possibly identical) phase and
    /// must be rescheduled, `false` when it absorbed the input and keeps its
    /// pending schedule.
    pub fn external_transition(
        &mut self,
        ctx: &mut Context,
        elapsed: Time,
        input: &Message,
    ) -> DevsResult<bool> {
        let handler = self
            .table
            .external(self.phase.as_str())
            .ok_or_else(|| self.missing(Operation::External, ctx.now()))?;
        let before = self.snapshot_for_trace(ctx);
        let outcome = handler(&mut self.state, elapsed, input);

        ctx.notify(&self.path, TraceKind::External, |event| {
            let outcome = match &outcome {
                ExternalOutcome::Enter(phase) => phase.to_string(),
                ExternalOutcome::Continue => "(cont)".to_string(),
            };
            event
                .with_phase(&self.phase)
                .with_outcome(outcome)
                .with_payload(serde_json::to_value(input).unwrap_or(Value::Null))
        });

        let rescheduled = match outcome {
            ExternalOutcome::Enter(phase) => {
                self.phase = phase;
                true
            }
            ExternalOutcome::Continue => false,
        };
        self.report_changes(ctx, before);
        Ok(rescheduled)
    }
}

#[derive(Serialize)]
struct AtomicModelRef<'a> {
    name: &'a str,
    path: &'a str,
    phase: &'a Phase,
    state: &'a State,
    behaviour: &'a (dyn Behaviour + 'static),
}

#[derive(Deserialize)]
struct AtomicModelRepr {
    name: String,
    path: String,
    phase: Phase,
    state: State,
    behaviour: Box<dyn Behaviour>,
}

impl Serialize for AtomicModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AtomicModelRef {
            name: &self.name,
            path: &self.path,
            phase: &self.phase,
            state: &self.state,
            behaviour: self.behaviour.as_ref(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AtomicModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = AtomicModelRepr::deserialize(deserializer)?;
        let table = repr.behaviour.dispatch_table();
        Ok(Self {
            name: repr.name,
            path: repr.path,
            phase: repr.phase,
            state: repr.state,
            behaviour: repr.behaviour,
            table,
        })
    }
}
