use super::endpoint::{EndpointRef, SELF_ENDPOINT};
use crate::errors::SpecificationError;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A declared coupling: one source endpoint fanned out to destination endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingDecl {
    pub source: String,
    pub destinations: Vec<String>,
}

impl CouplingDecl {
    pub fn new<I, S>(source: impl Into<String>, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            destinations: destinations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CouplingClass {
    /// `self` to a submodel.
    ExternalInput,
    /// A submodel to `self`.
    ExternalOutput,
    /// Submodel to submodel.
    Internal,
}

impl fmt::Display for CouplingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CouplingClass::ExternalInput => "EIC",
            CouplingClass::ExternalOutput => "EOC",
            CouplingClass::Internal => "IC",
        };
        f.write_str(label)
    }
}

pub type RoutingGraph = Graph<String, CouplingClass>;

/// Resolved couplings of a coupled model.
///
/// Every instance and `self` is a node; every concrete source/destination
/// pair is an edge labelled with its [`CouplingClass`]. Duplicate pairs are
/// collapsed and destinations are reported in declaration order.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    graph: RoutingGraph,
    nodes: HashMap<String, NodeIndex>,
}

impl RoutingTable {
    /// Expand and validate `couplings` against the declared instance names.
    pub fn resolve(
        instances: &[String],
        couplings: &[CouplingDecl],
    ) -> Result<Self, SpecificationError> {
        let mut graph = RoutingGraph::new();
        let mut nodes = HashMap::new();
        nodes.insert(
            SELF_ENDPOINT.to_string(),
            graph.add_node(SELF_ENDPOINT.to_string()),
        );
        for name in instances {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }

        let mut table = Self { graph, nodes };
        for coupling in couplings {
            table.add_coupling(coupling)?;
        }
        Ok(table)
    }

    fn lookup(&self, name: &str) -> Result<NodeIndex, SpecificationError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| SpecificationError::UndeclaredEndpoint(name.to_string()))
    }

    fn add_coupling(&mut self, coupling: &CouplingDecl) -> Result<(), SpecificationError> {
        let source = EndpointRef::parse(&coupling.source)?;
        let destinations = coupling
            .destinations
            .iter()
            .map(|d| EndpointRef::parse(d))
            .collect::<Result<Vec<_>, _>>()?;
        if destinations.is_empty() {
            return Err(SpecificationError::NoDestinations(coupling.source.clone()));
        }

        let to_self = destinations.iter().filter(|d| d.is_own()).count();
        let class = match (source.is_own(), to_self) {
            (true, 0) => CouplingClass::ExternalInput,
            (false, n) if n == destinations.len() => CouplingClass::ExternalOutput,
            (false, 0) => CouplingClass::Internal,
            _ => {
                return Err(SpecificationError::AmbiguousCoupling {
                    origin: coupling.source.clone(),
                })
            }
        };

        for from in source.expand() {
            let from_index = self.lookup(&from)?;
            for destination in &destinations {
                for to in destination.expand() {
                    let to_index = self.lookup(&to)?;
                    if from_index == to_index {
                        return Err(SpecificationError::SelfLoop(from));
                    }
                    if self.graph.find_edge(from_index, to_index).is_none() {
                        self.graph.add_edge(from_index, to_index, class);
                    }
                }
            }
        }
        Ok(())
    }

    /// Where output of `source` is delivered, in declaration order.
    pub fn destinations(&self, source: &str) -> Vec<&str> {
        let Some(&index) = self.nodes.get(source) else {
            return vec![];
        };
        let mut edges: Vec<_> = self.graph.edges(index).collect();
        edges.sort_by_key(|edge| edge.id().index());
        edges
            .into_iter()
            .map(|edge| self.graph[edge.target()].as_str())
            .collect()
    }

    /// Every resolved edge as `(source, destination, class)`, in declaration order.
    pub fn edges(&self) -> Vec<(&str, &str, CouplingClass)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                    *edge.weight(),
                )
            })
            .collect()
    }

    pub fn count(&self, class: CouplingClass) -> usize {
        self.graph
            .edge_weights()
            .filter(|weight| **weight == class)
            .count()
    }

    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Graphviz rendering of the couplings
    ///
    /// Useful for debugging
    pub fn as_dot(&self) -> Dot<'_, &RoutingGraph> {
        Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| format!("label = \"{}\"", edge.weight()),
            &|_, (_, name)| format!("label = {:?}", name),
        )
    }
}
