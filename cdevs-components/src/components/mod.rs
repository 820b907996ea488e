mod generator;
mod processor;
mod procgen;

use cdevs_core::atomic::AtomicModel;
use cdevs_core::registry::{decode_parameter, Model, ModelRegistry};

pub use generator::{Generator, GENERATOR_CLASS, JOB_PORT};
pub use processor::{Processor, PROCESSOR_CLASS};
pub use procgen::{GeneratorProcessor, GENERATOR_PROCESSOR_CLASS};

pub const GENERATOR_MODULE: &str = "generator";
pub const PROCESSOR_MODULE: &str = "processor";
pub const PROCGEN_MODULE: &str = "procgen";

/// Install the stock models in `registry`.
///
/// Generators without an explicit `source` are labelled with their instance name.
pub fn register_components(registry: &mut ModelRegistry) {
    registry.register(GENERATOR_MODULE, GENERATOR_CLASS, |name, init| {
        let mut generator: Generator =
            decode_parameter(GENERATOR_MODULE, GENERATOR_CLASS, name, init)?;
        if generator.source.is_none() {
            generator.source = Some(name.to_string());
        }
        Ok(Model::Atomic(AtomicModel::from_behaviour(name, generator)))
    });
    registry.register_atomic::<Processor>(PROCESSOR_MODULE, PROCESSOR_CLASS);
    registry.register_coupled::<GeneratorProcessor>(PROCGEN_MODULE, GENERATOR_PROCESSOR_CLASS);
    log::debug!("Registered stock components in {:?}", registry);
}
