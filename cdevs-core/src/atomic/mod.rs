//! Atomic models.
//!
//! An atomic model is a phase and a set of state variables together with a
//! [`DispatchTable`] mapping every phase to its internal transition, external
//! transition, time advance and output callbacks. All models start in the
//! [`INIT_PHASE`] phase, so every model must at least provide a time advance
//! for `init`.

mod dispatch;
mod model;
mod phase;
mod state;

pub use dispatch::{
    DispatchTable, ExternalHandler, ExternalOutcome, InternalHandler, OutputHandler,
    PhaseHandlers, TimeAdvanceHandler,
};
pub use model::{AtomicModel, Behaviour};
pub use phase::{Phase, INIT_PHASE};
pub use state::State;
