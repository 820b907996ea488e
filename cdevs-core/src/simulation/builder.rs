//! Builder for root coordinators.

use super::coordinator::Node;
use super::root::RootCoordinator;
use crate::descriptor::ModelDescriptor;
use crate::errors::{DevsError, DevsResult};
use crate::registry::ModelRegistry;
use crate::time::Time;
use crate::trace::{LogSink, TraceFilter, TraceSink};

/// Collects the settings of a run, then instantiates and initialises the hierarchy.
pub struct RootBuilder<'a, S: TraceSink = LogSink> {
    registry: &'a ModelRegistry,
    end_time: Option<Time>,
    root: Option<ModelDescriptor>,
    filter: TraceFilter,
    strict_select: bool,
    sink: S,
}

impl<'a> RootBuilder<'a, LogSink> {
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self {
            registry,
            end_time: None,
            root: None,
            filter: TraceFilter::new(),
            strict_select: false,
            sink: LogSink::default(),
        }
    }
}

impl<'a, S: TraceSink> RootBuilder<'a, S> {
    /// Events scheduled at exactly `end_time` still run.
    pub fn with_end_time(mut self, end_time: Time) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_root_model(mut self, root: ModelDescriptor) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_trace_filter(mut self, filter: TraceFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fail construction when a coupled model leaves a possible conflict unresolved.
    pub fn with_strict_select(mut self, strict: bool) -> Self {
        self.strict_select = strict;
        self
    }

    /// Send trace notifications to `sink` instead.
    pub fn with_sink<T: TraceSink>(self, sink: T) -> RootBuilder<'a, T> {
        RootBuilder {
            registry: self.registry,
            end_time: self.end_time,
            root: self.root,
            filter: self.filter,
            strict_select: self.strict_select,
            sink,
        }
    }

    pub fn build(self) -> DevsResult<RootCoordinator<S>> {
        let end_time = self
            .end_time
            .ok_or_else(|| DevsError::Error("No end time was provided".to_string()))?;
        if end_time.is_nan() || end_time < 0.0 {
            return Err(DevsError::Error(format!(
                "End time must be a non-negative time, got {end_time}"
            )));
        }
        let root = self
            .root
            .ok_or_else(|| DevsError::Error("No root model was provided".to_string()))?;
        if root.count > 1 {
            return Err(DevsError::Error(format!(
                "The root model '{}' cannot be replicated (count = {})",
                root.name, root.count
            )));
        }

        let model = self.registry.instantiate(&root, &root.name)?;
        let top = Node::build(model, "", self.registry, self.strict_select)?;
        RootCoordinator::start(top, end_time, self.filter, self.sink)
    }
}
