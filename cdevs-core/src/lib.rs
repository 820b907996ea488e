pub mod atomic;
pub mod config;
pub mod context;
pub mod coupled;
pub mod descriptor;
pub mod message;
pub mod registry;
pub mod simulation;
pub mod time;
pub mod trace;

pub mod errors;

#[cfg(test)]
mod example_models;
