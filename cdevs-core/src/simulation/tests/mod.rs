//! Integration tests for the simulation hierarchy.
//!
//! These build complete hierarchies through the registry and drive them with
//! a root coordinator.

#[cfg(test)]
mod tracing;
