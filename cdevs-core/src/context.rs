//! Per-step context handed down the hierarchy.

use crate::time::Time;
use crate::trace::{TraceEvent, TraceFilter, TraceKind, TraceSink};

/// The current simulated time and the trace channel for one step.
///
/// The clock itself belongs to the root coordinator; nodes only read it
/// through this context.
pub struct Context<'a> {
    now: Time,
    filter: &'a TraceFilter,
    sink: &'a mut dyn TraceSink,
}

impl<'a> Context<'a> {
    pub fn new(now: Time, filter: &'a TraceFilter, sink: &'a mut dyn TraceSink) -> Self {
        Self { now, filter, sink }
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn tracing(&self, path: &str, kind: TraceKind) -> bool {
        self.filter.enabled(path, kind)
    }

    /// Emit an event if the filter selects it. `build` is only called when it does.
    pub fn notify<F>(&mut self, path: &str, kind: TraceKind, build: F)
    where
        F: FnOnce(TraceEvent) -> TraceEvent,
    {
        if self.filter.enabled(path, kind) {
            let event = build(TraceEvent::new(self.now, path, kind));
            self.sink.record(&event);
        }
    }
}
