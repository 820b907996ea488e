use crate::time::Time;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use serde_json::Value;

/// A value placed on an output port, later delivered as an input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub port: String,
    pub value: Value,
}

impl Message {
    pub fn new(port: impl Into<String>, value: Value) -> Self {
        Self {
            port: port.into(),
            value,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.port, self.value)
    }
}

/// A message emitted by the top-level model, stamped with the time it left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedMessage {
    pub time: Time,
    pub message: Message,
}
