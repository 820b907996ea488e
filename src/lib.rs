//! Classic DEVS simulation.
//!
//! Atomic models are phases plus state variables driven by per-phase
//! callbacks; coupled models wire replicated submodels together and break
//! ties between simultaneous events with ordered select rules. A
//! [`RootCoordinator`] runs a model hierarchy until an end time.
//!
//! ```no_run
//! use cdevs::{register_components, ModelDescriptor, ModelRegistry, RootCoordinator};
//! use serde_json::json;
//!
//! let mut registry = ModelRegistry::new();
//! register_components(&mut registry);
//!
//! let root = ModelDescriptor::single(
//!     "procgen",
//!     "GeneratorProcessor",
//!     "top",
//!     json!({"period": 2.0, "service_time": 3.0, "generators": 2}),
//! );
//! let mut rc = RootCoordinator::new(10.0, root, &registry).unwrap();
//! rc.run().unwrap();
//! for output in rc.outputs() {
//!     println!("{}: {}", output.time, output.message);
//! }
//! ```

pub use cdevs_components::components;
pub use cdevs_components::register_components;
pub use cdevs_core::{
    atomic, config, context, coupled, descriptor, errors, message, registry, simulation, time,
    trace,
};

pub use cdevs_core::atomic::{AtomicModel, Behaviour, DispatchTable, ExternalOutcome, Phase, State};
pub use cdevs_core::config::SimulationConfig;
pub use cdevs_core::coupled::{CoupledBehaviour, CoupledSpec, CouplingDecl, SelectRuleDecl};
pub use cdevs_core::descriptor::ModelDescriptor;
pub use cdevs_core::errors::{DevsError, DevsResult};
pub use cdevs_core::message::{Message, TimedMessage};
pub use cdevs_core::registry::{Model, ModelRegistry};
pub use cdevs_core::simulation::{RootCoordinator, RootStatus};
pub use cdevs_core::time::{Time, INFINITY};
pub use cdevs_core::trace::{LogSink, NullSink, TraceEvent, TraceFilter, TraceKind, TraceSink};
