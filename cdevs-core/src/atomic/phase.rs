use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Every atomic model starts in this phase.
pub const INIT_PHASE: &str = "init";

/// Named regime of an atomic model.
///
/// Callbacks are registered per phase, so the phase is what selects which
/// internal, external, time-advance and output function applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn init() -> Self {
        Self::new(INIT_PHASE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::init()
    }
}

impl From<&str> for Phase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Phase {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for Phase {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Phase {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Phase {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
