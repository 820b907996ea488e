//! The hierarchical simulation protocol.
//!
//! Every atomic model is driven by a [`Simulator`] holding its last and next
//! event times; every coupled model by a [`Coordinator`] that picks the
//! imminent child (asking the select rules when there is more than one) and
//! routes the resulting output along the couplings. A single
//! [`RootCoordinator`] owns the simulation clock and repeatedly asks the
//! top-level node to process its next event until the end time is passed.
//!
//! Only one child transitions per step. Other children scheduled for the same
//! time keep their schedule and are handled by the following steps, so the
//! clock may stay at the same value for several steps.

mod builder;
mod coordinator;
mod root;
mod simulator;

#[cfg(test)]
mod tests;

pub use builder::RootBuilder;
pub use coordinator::{Coordinator, Node};
pub use root::{RootCoordinator, RootStatus};
pub use simulator::Simulator;
