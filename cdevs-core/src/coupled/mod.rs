//! Coupled models.
//!
//! A coupled model is a set of submodel instances, the couplings that route
//! output between them (and to and from the model's own `self` port) and the
//! select rules that decide which of several simultaneously imminent
//! submodels transitions first.

mod endpoint;
mod model;
mod routing;
mod select;

pub use endpoint::{EndpointRef, SELF_ENDPOINT};
pub use model::{CoupledBehaviour, CoupledModel, CoupledSpec, CoupledStructure, Instance};
pub use routing::{CouplingClass, CouplingDecl, RoutingGraph, RoutingTable};
pub use select::{
    NamePattern, SelectFailure, SelectResolver, SelectRule, SelectRuleDecl,
    MAX_ENUMERATED_INSTANCES,
};
