use super::simulator::Simulator;
use crate::atomic::AtomicModel;
use crate::context::Context;
use crate::coupled::{CoupledModel, CoupledStructure, RoutingTable, SELF_ENDPOINT};
use crate::errors::{DevsError, DevsResult};
use crate::message::Message;
use crate::registry::{Model, ModelRegistry};
use crate::time::{Time, INFINITY};
use crate::trace::TraceKind;
use serde_json::json;
use std::collections::HashMap;

/// A node of the simulation hierarchy.
#[derive(Debug)]
pub enum Node {
    Simulator(Simulator),
    Coordinator(Coordinator),
}

impl Node {
    /// Build the node for `model` below `parent_path`, recursively instantiating submodels.
    pub fn build(
        model: Model,
        parent_path: &str,
        registry: &ModelRegistry,
        strict_select: bool,
    ) -> DevsResult<Self> {
        match model {
            Model::Atomic(mut model) => {
                model.attach(parent_path);
                Ok(Node::Simulator(Simulator::new(model)))
            }
            Model::Coupled(model) => Ok(Node::Coordinator(Coordinator::build(
                model,
                parent_path,
                registry,
                strict_select,
            )?)),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::Simulator(sim) => sim.model().path(),
            Node::Coordinator(coord) => coord.path(),
        }
    }

    pub fn time_last(&self) -> Time {
        match self {
            Node::Simulator(sim) => sim.time_last(),
            Node::Coordinator(coord) => coord.time_last(),
        }
    }

    pub fn time_next(&self) -> Time {
        match self {
            Node::Simulator(sim) => sim.time_next(),
            Node::Coordinator(coord) => coord.time_next(),
        }
    }

    /// Find the atomic model at `path` in this subtree.
    pub fn atomic(&self, path: &str) -> Option<&AtomicModel> {
        match self {
            Node::Simulator(sim) => (sim.model().path() == path).then(|| sim.model()),
            Node::Coordinator(coord) => coord.children.iter().find_map(|c| c.atomic(path)),
        }
    }

    /// Find the coordinator at `path` in this subtree.
    pub fn coordinator(&self, path: &str) -> Option<&Coordinator> {
        match self {
            Node::Simulator(_) => None,
            Node::Coordinator(coord) if coord.path == path => Some(coord),
            Node::Coordinator(coord) => coord.children.iter().find_map(|c| c.coordinator(path)),
        }
    }

    pub(crate) fn initialise(&mut self, ctx: &mut Context) -> DevsResult<()> {
        match self {
            Node::Simulator(sim) => sim.initialise(ctx),
            Node::Coordinator(coord) => coord.initialise(ctx),
        }
    }

    pub(crate) fn internal_transition(&mut self, ctx: &mut Context) -> DevsResult<Option<Message>> {
        match self {
            Node::Simulator(sim) => sim.internal_transition(ctx),
            Node::Coordinator(coord) => coord.internal_transition(ctx),
        }
    }

    pub(crate) fn external_transition(&mut self, ctx: &mut Context, input: &Message) -> DevsResult<()> {
        match self {
            Node::Simulator(sim) => sim.external_transition(ctx, input),
            Node::Coordinator(coord) => coord.external_transition(ctx, input),
        }
    }
}

/// Drives a coupled model: picks the imminent child and routes its output.
#[derive(Debug)]
pub struct Coordinator {
    name: String,
    path: String,
    structure: CoupledStructure,
    children: Vec<Node>,
    index: HashMap<String, usize>,
}

impl Coordinator {
    pub fn build(
        model: CoupledModel,
        parent_path: &str,
        registry: &ModelRegistry,
        strict_select: bool,
    ) -> DevsResult<Self> {
        let path = format!("{}/{}", parent_path, model.name());
        let structure = model.resolve(&path, strict_select)?;

        let mut children = Vec::with_capacity(structure.instances.len());
        let mut index = HashMap::new();
        for instance in &structure.instances {
            let child = registry.instantiate(&instance.descriptor, &instance.name)?;
            index.insert(instance.name.clone(), children.len());
            children.push(Node::build(child, &path, registry, strict_select)?);
        }

        Ok(Self {
            name: model.name().to_string(),
            path,
            structure,
            children,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.structure.routing
    }

    /// Earliest scheduled event among the children.
    pub fn time_next(&self) -> Time {
        self.children
            .iter()
            .map(Node::time_next)
            .fold(INFINITY, Time::min)
    }

    /// Latest event any child has processed.
    pub fn time_last(&self) -> Time {
        self.children
            .iter()
            .map(Node::time_last)
            .fold(0.0, Time::max)
    }

    fn initialise(&mut self, ctx: &mut Context) -> DevsResult<()> {
        for child in self.children.iter_mut() {
            child.initialise(ctx)?;
        }
        Ok(())
    }

    fn child_mut(&mut self, name: &str) -> DevsResult<&mut Node> {
        let index = *self
            .index
            .get(name)
            .ok_or_else(|| DevsError::Error(format!("{}: no submodel named '{name}'", self.path)))?;
        Ok(&mut self.children[index])
    }

    /// Pick the child to transition at the current time.
    fn select(&self, ctx: &mut Context) -> DevsResult<String> {
        let now = ctx.now();
        let imminent: Vec<&str> = self
            .structure
            .instances
            .iter()
            .zip(&self.children)
            .filter(|(_, child)| child.time_next() == now)
            .map(|(instance, _)| instance.name.as_str())
            .collect();

        match imminent.as_slice() {
            [] => Err(DevsError::ClockInvariantViolation {
                model: self.path.clone(),
                phase: "coupled".to_string(),
                time: now,
                clock: self.time_next(),
                reason: "no submodel is imminent".to_string(),
            }),
            [only] => Ok(only.to_string()),
            _ => {
                let winner = self.structure.select.resolve(&imminent).map_err(|failure| {
                    let mut candidates: Vec<String> =
                        imminent.iter().map(|s| s.to_string()).collect();
                    candidates.sort();
                    DevsError::UnresolvedConflict {
                        model: self.path.clone(),
                        time: now,
                        candidates,
                        reason: failure.to_string(),
                    }
                })?;
                ctx.notify(&self.path, TraceKind::Select, |event| {
                    let mut candidates = imminent.clone();
                    candidates.sort_unstable();
                    event.with_outcome(winner).with_payload(json!(candidates))
                });
                Ok(winner.to_string())
            }
        }
    }

    fn internal_transition(&mut self, ctx: &mut Context) -> DevsResult<Option<Message>> {
        let winner = self.select(ctx)?;
        match self.child_mut(&winner)?.internal_transition(ctx)? {
            Some(message) => self.route(ctx, &winner, message),
            None => Ok(None),
        }
    }

    /// Deliver `message` from `source` to its destinations at the current time.
    ///
    /// Returns the message if it must leave this model through `self`.
    fn route(&mut self, ctx: &mut Context, source: &str, message: Message) -> DevsResult<Option<Message>> {
        let destinations: Vec<String> = self
            .structure
            .routing
            .destinations(source)
            .into_iter()
            .map(String::from)
            .collect();
        if destinations.is_empty() {
            log::debug!(
                "{}: output of '{source}' on port '{}' has no coupling, dropped",
                self.path,
                message.port
            );
            return Ok(None);
        }

        let mut upward = None;
        for destination in destinations {
            if destination == SELF_ENDPOINT {
                upward = Some(message.clone());
                continue;
            }
            log::debug!(
                "{}: t={} routing '{source}' -> '{destination}' ({})",
                self.path,
                ctx.now(),
                message.port
            );
            self.child_mut(&destination)?
                .external_transition(ctx, &message)?;
        }
        Ok(upward)
    }

    fn external_transition(&mut self, ctx: &mut Context, input: &Message) -> DevsResult<()> {
        let destinations: Vec<String> = self
            .structure
            .routing
            .destinations(SELF_ENDPOINT)
            .into_iter()
            .map(String::from)
            .collect();
        if destinations.is_empty() {
            log::debug!(
                "{}: input on port '{}' has no external input coupling, dropped",
                self.path,
                input.port
            );
        }
        for destination in destinations {
            self.child_mut(&destination)?
                .external_transition(ctx, input)?;
        }
        Ok(())
    }
}
