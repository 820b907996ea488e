//! Phase-indexed callback tables.
//!
//! An atomic model registers, for each phase it can occupy, up to four
//! callbacks: internal transition, external transition, time advance and
//! output. Lookups that miss are reported to the caller instead of falling back
//! to a default, so a phase the modeller forgot to cover fails loudly the first
//! time it is exercised.

use super::phase::Phase;
use super::state::State;
use crate::errors::Operation;
use crate::message::Message;
use crate::time::Time;
use std::collections::BTreeMap;
use std::fmt;

pub type InternalHandler = Box<dyn Fn(&mut State) -> Phase>;
pub type ExternalHandler = Box<dyn Fn(&mut State, Time, &Message) -> ExternalOutcome>;
pub type TimeAdvanceHandler = Box<dyn Fn(&State) -> Time>;
pub type OutputHandler = Box<dyn Fn(&State) -> Option<Message>>;

/// Result of an external transition callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// The model moves to the given phase; its elapsed time restarts from zero.
    Enter(Phase),
    /// The input was absorbed; the phase and the pending schedule are kept.
    Continue,
}

impl ExternalOutcome {
    pub fn enter(phase: impl Into<Phase>) -> Self {
        ExternalOutcome::Enter(phase.into())
    }
}

/// The callbacks registered for a single phase.
#[derive(Default)]
pub struct PhaseHandlers {
    internal: Option<InternalHandler>,
    external: Option<ExternalHandler>,
    time_advance: Option<TimeAdvanceHandler>,
    output: Option<OutputHandler>,
}

impl PhaseHandlers {
    pub fn provides(&self, operation: Operation) -> bool {
        match operation {
            Operation::Internal => self.internal.is_some(),
            Operation::External => self.external.is_some(),
            Operation::TimeAdvance => self.time_advance.is_some(),
            Operation::Output => self.output.is_some(),
        }
    }
}

/// Mapping from phase to its callbacks, built fluently.
///
/// ```
/// use cdevs_core::atomic::{DispatchTable, ExternalOutcome};
/// use cdevs_core::time::INFINITY;
///
/// let table = DispatchTable::new()
///     .on_time_advance("init", |_| INFINITY)
///     .on_external("init", |_, _, _| ExternalOutcome::enter("done"))
///     .on_time_advance("done", |_| INFINITY);
/// assert!(table.has_phase("done"));
/// ```
#[derive(Default)]
pub struct DispatchTable {
    phases: BTreeMap<Phase, PhaseHandlers>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, phase: Phase) -> &mut PhaseHandlers {
        self.phases.entry(phase).or_default()
    }

    pub fn on_internal<F, P>(mut self, phase: impl Into<Phase>, handler: F) -> Self
    where
        F: Fn(&mut State) -> P + 'static,
        P: Into<Phase>,
    {
        self.entry(phase.into()).internal = Some(Box::new(move |state| handler(state).into()));
        self
    }

    pub fn on_external<F>(mut self, phase: impl Into<Phase>, handler: F) -> Self
    where
        F: Fn(&mut State, Time, &Message) -> ExternalOutcome + 'static,
    {
        self.entry(phase.into()).external = Some(Box::new(handler));
        self
    }

    pub fn on_time_advance<F>(mut self, phase: impl Into<Phase>, handler: F) -> Self
    where
        F: Fn(&State) -> Time + 'static,
    {
        self.entry(phase.into()).time_advance = Some(Box::new(handler));
        self
    }

    pub fn on_output<F>(mut self, phase: impl Into<Phase>, handler: F) -> Self
    where
        F: Fn(&State) -> Option<Message> + 'static,
    {
        self.entry(phase.into()).output = Some(Box::new(handler));
        self
    }

    /// Declare that leaving `phase` through an internal transition emits nothing.
    pub fn silent(self, phase: impl Into<Phase>) -> Self {
        self.on_output(phase, |_| None)
    }

    pub fn has_phase(&self, phase: &str) -> bool {
        self.phases.contains_key(phase)
    }

    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.keys()
    }

    pub fn provides(&self, phase: &str, operation: Operation) -> bool {
        self.phases
            .get(phase)
            .map(|handlers| handlers.provides(operation))
            .unwrap_or(false)
    }

    pub(crate) fn internal(&self, phase: &str) -> Option<&InternalHandler> {
        self.phases.get(phase).and_then(|h| h.internal.as_ref())
    }

    pub(crate) fn external(&self, phase: &str) -> Option<&ExternalHandler> {
        self.phases.get(phase).and_then(|h| h.external.as_ref())
    }

    pub(crate) fn time_advance(&self, phase: &str) -> Option<&TimeAdvanceHandler> {
        self.phases.get(phase).and_then(|h| h.time_advance.as_ref())
    }

    pub(crate) fn output(&self, phase: &str) -> Option<&OutputHandler> {
        self.phases.get(phase).and_then(|h| h.output.as_ref())
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (phase, handlers) in &self.phases {
            let provided: Vec<String> = [
                Operation::Internal,
                Operation::External,
                Operation::TimeAdvance,
                Operation::Output,
            ]
            .into_iter()
            .filter(|op| handlers.provides(*op))
            .map(|op| op.to_string())
            .collect();
            map.entry(&phase.as_str(), &provided);
        }
        map.finish()
    }
}
