use crate::time::Time;
use std::fmt;
use thiserror::Error;

/// The four callback slots an atomic model may declare for a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Internal,
    External,
    TimeAdvance,
    Output,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::Internal => "internal transition",
            Operation::External => "external transition",
            Operation::TimeAdvance => "time advance",
            Operation::Output => "output",
        };
        f.write_str(label)
    }
}

/// Faults detected while a coupled model is being resolved.
///
/// These are always reported at construction time, before the first step runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecificationError {
    #[error("malformed endpoint expression '{0}'")]
    MalformedEndpoint(String),
    #[error("empty range '{base}[{lo}:{hi}]': lower bound must be below upper bound")]
    EmptyRange { base: String, lo: usize, hi: usize },
    #[error("coupling references undeclared submodel '{0}'")]
    UndeclaredEndpoint(String),
    #[error("coupling from '{origin}' mixes 'self' with other destinations or loops 'self' onto itself")]
    AmbiguousCoupling { origin: String },
    #[error("coupling from '{0}' lists no destinations")]
    NoDestinations(String),
    #[error("internal coupling connects '{0}' to itself")]
    SelfLoop(String),
    #[error("submodel instance name '{0}' cannot be used in couplings")]
    InvalidInstanceName(String),
    #[error("submodel instance '{0}' is declared more than once")]
    DuplicateInstance(String),
    #[error("coupled model declares no submodels")]
    NoSubmodels,
    #[error("invalid select pattern '{pattern}': {details}")]
    InvalidPattern { pattern: String, details: String },
    #[error("select winner pattern '{0}' matches no declared submodel")]
    UnreachableWinner(String),
    #[error("select rules leave the conflict {0:?} unresolved")]
    IncompleteSelect(Vec<String>),
}

/// Error type for simulation construction and execution.
///
/// None of these are recoverable: a run aborts on the first one.
#[derive(Error, Debug)]
pub enum DevsError {
    #[error("{0}")]
    Error(String),
    #[error("Invalid specification for model '{model}': {kind}")]
    Specification {
        model: String,
        kind: SpecificationError,
    },
    #[error("Model '{model}' has no {operation} callback for phase '{phase}' (t={time})")]
    MissingCallback {
        model: String,
        phase: String,
        operation: Operation,
        time: Time,
    },
    #[error("Unresolved conflict in '{model}' at t={time} among {candidates:?}: {reason}")]
    UnresolvedConflict {
        model: String,
        time: Time,
        candidates: Vec<String>,
        reason: String,
    },
    #[error("Clock invariant violated by '{model}' in phase '{phase}' at t={time} (clock={clock}): {reason}")]
    ClockInvariantViolation {
        model: String,
        phase: String,
        time: Time,
        clock: Time,
        reason: String,
    },
    #[error("No model type registered for {module}.{class}")]
    UnknownModelType { module: String, class: String },
    #[error("Invalid initial parameter for '{name}' ({module}.{class}): {details}")]
    InvalidParameter {
        module: String,
        class: String,
        name: String,
        details: String,
    },
    #[error(transparent)]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DevsError {
    pub(crate) fn specification(model: &str, kind: SpecificationError) -> Self {
        DevsError::Specification {
            model: model.to_string(),
            kind,
        }
    }
}

/// Convenience type for `Result<T, DevsError>`.
pub type DevsResult<T> = Result<T, DevsError>;
