use super::builder::RootBuilder;
use super::coordinator::Node;
use crate::atomic::AtomicModel;
use crate::config::SimulationConfig;
use crate::context::Context;
use crate::descriptor::ModelDescriptor;
use crate::errors::{DevsError, DevsResult};
use crate::message::TimedMessage;
use crate::registry::ModelRegistry;
use crate::time::Time;
use crate::trace::{LogSink, TraceFilter, TraceSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStatus {
    /// Built and initialised, no step taken yet.
    Ready,
    Running,
    /// The next event lies beyond the end time, or a step failed.
    Terminated,
}

/// Owns the simulation clock and drives the top-level model until the end time.
#[derive(Debug)]
pub struct RootCoordinator<S: TraceSink = LogSink> {
    top: Node,
    end_time: Time,
    clock: Time,
    status: RootStatus,
    filter: TraceFilter,
    sink: S,
    outputs: Vec<TimedMessage>,
}

impl RootCoordinator<LogSink> {
    pub fn builder(registry: &ModelRegistry) -> RootBuilder<'_, LogSink> {
        RootBuilder::new(registry)
    }

    /// Build a run of `root` until `end_time` with default tracing.
    pub fn new(end_time: Time, root: ModelDescriptor, registry: &ModelRegistry) -> DevsResult<Self> {
        Self::builder(registry)
            .with_end_time(end_time)
            .with_root_model(root)
            .build()
    }

    pub fn from_config(config: &SimulationConfig, registry: &ModelRegistry) -> DevsResult<Self> {
        Self::builder(registry)
            .with_end_time(config.end_time)
            .with_root_model(config.root.clone())
            .with_strict_select(config.strict_select)
            .with_trace_filter(config.trace.filters.clone())
            .with_sink(config.trace.sink())
            .build()
    }
}

impl<S: TraceSink> RootCoordinator<S> {
    /// Initialise every simulator of `top` at time zero.
    pub(crate) fn start(
        mut top: Node,
        end_time: Time,
        filter: TraceFilter,
        mut sink: S,
    ) -> DevsResult<Self> {
        {
            let mut ctx = Context::new(0.0, &filter, &mut sink);
            top.initialise(&mut ctx)?;
        }
        log::debug!(
            "Initialised '{}', first event at t={}",
            top.path(),
            top.time_next()
        );
        Ok(Self {
            top,
            end_time,
            clock: 0.0,
            status: RootStatus::Ready,
            filter,
            sink,
            outputs: vec![],
        })
    }

    /// Advance to the next event and process it.
    ///
    /// Returns the time the step ran at, or `None` once the next event lies
    /// beyond the end time or no model has an event scheduled at all.
    pub fn step(&mut self) -> DevsResult<Option<Time>> {
        if self.status == RootStatus::Terminated {
            return Ok(None);
        }
        let next = self.top.time_next();
        if next > self.end_time || !next.is_finite() {
            self.status = RootStatus::Terminated;
            log::info!(
                "Simulation of '{}' finished at t={} (end time {})",
                self.top.path(),
                self.clock,
                self.end_time
            );
            return Ok(None);
        }
        if next < self.clock {
            self.status = RootStatus::Terminated;
            return Err(DevsError::ClockInvariantViolation {
                model: self.top.path().to_string(),
                phase: "root".to_string(),
                time: next,
                clock: self.clock,
                reason: "next event lies before the current time".to_string(),
            });
        }

        self.clock = next;
        self.status = RootStatus::Running;
        let result = {
            let mut ctx = Context::new(next, &self.filter, &mut self.sink);
            self.top.internal_transition(&mut ctx)
        };
        match result {
            Ok(Some(message)) => {
                log::info!("t={next}: {} emitted {message}", self.top.path());
                self.outputs.push(TimedMessage {
                    time: next,
                    message,
                });
            }
            Ok(None) => {}
            Err(e) => {
                self.status = RootStatus::Terminated;
                return Err(e);
            }
        }
        Ok(Some(next))
    }

    /// Step until the end time is passed.
    pub fn run(&mut self) -> DevsResult<()> {
        while self.step()?.is_some() {}
        Ok(())
    }

    pub fn current_time(&self) -> Time {
        self.clock
    }

    pub fn end_time(&self) -> Time {
        self.end_time
    }

    /// Time of the next pending event anywhere in the hierarchy.
    pub fn time_next(&self) -> Time {
        self.top.time_next()
    }

    pub fn status(&self) -> RootStatus {
        self.status
    }

    pub fn finished(&self) -> bool {
        self.status == RootStatus::Terminated
    }

    /// Messages the top-level model sent out, with the time they were sent.
    pub fn outputs(&self) -> &[TimedMessage] {
        &self.outputs
    }

    pub fn top(&self) -> &Node {
        &self.top
    }

    /// The atomic model at a full path such as `/top/proc`.
    pub fn atomic(&self, path: &str) -> Option<&AtomicModel> {
        self.top.atomic(path)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
