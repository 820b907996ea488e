//! Trace notifications.
//!
//! The kernel reports what happens during a run (transitions, time advances,
//! outputs, select decisions and state-variable changes) as [`TraceEvent`]s.
//! A [`TraceFilter`] decides which model paths and event kinds are reported and
//! a [`TraceSink`] decides where they go. Formatting is entirely the sink's
//! concern.

use crate::atomic::Phase;
use crate::config::{DEFAULT_PATH_WIDTH, DEFAULT_PHASE_WIDTH};
use crate::message::Value;
use crate::time::Time;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Path or kind wildcard accepted in trace filters.
pub const WILDCARD: &str = "*";

/// Kind of a trace notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Internal,
    External,
    #[serde(rename = "ta")]
    TimeAdvance,
    Output,
    Select,
    State,
}

impl TraceKind {
    /// Fixed-width column tag used by [`LogSink`].
    pub fn tag(&self) -> &'static str {
        match self {
            TraceKind::Internal => "dint",
            TraceKind::External => "dext",
            TraceKind::TimeAdvance => "  ta",
            TraceKind::Output => " out",
            TraceKind::Select => "slct",
            TraceKind::State => " set",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TraceKind::Internal => "internal",
            TraceKind::External => "external",
            TraceKind::TimeAdvance => "ta",
            TraceKind::Output => "output",
            TraceKind::Select => "select",
            TraceKind::State => "state",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TraceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(TraceKind::Internal),
            "external" => Ok(TraceKind::External),
            "ta" => Ok(TraceKind::TimeAdvance),
            "output" => Ok(TraceKind::Output),
            "select" => Ok(TraceKind::Select),
            "state" => Ok(TraceKind::State),
            other => Err(format!("unknown trace kind '{other}'")),
        }
    }
}

/// One entry of a filter: either every kind or a single one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TraceSelector {
    All,
    Kind(TraceKind),
}

impl TraceSelector {
    fn selects(&self, kind: TraceKind) -> bool {
        match self {
            TraceSelector::All => true,
            TraceSelector::Kind(k) => *k == kind,
        }
    }
}

impl FromStr for TraceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == WILDCARD {
            Ok(TraceSelector::All)
        } else {
            s.parse().map(TraceSelector::Kind)
        }
    }
}

impl TryFrom<String> for TraceSelector {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TraceSelector> for String {
    fn from(value: TraceSelector) -> Self {
        match value {
            TraceSelector::All => WILDCARD.to_string(),
            TraceSelector::Kind(kind) => kind.name().to_string(),
        }
    }
}

impl From<TraceKind> for TraceSelector {
    fn from(value: TraceKind) -> Self {
        TraceSelector::Kind(value)
    }
}

/// Which model paths report which kinds of events.
///
/// Keys are full model paths (e.g. `/top/gen:0`) or `*` for every model.
/// An empty filter reports nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceFilter {
    entries: BTreeMap<String, BTreeSet<TraceSelector>>,
}

impl TraceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every kind of event for every model.
    pub fn all() -> Self {
        Self::new().with(WILDCARD, [TraceSelector::All])
    }

    pub fn with<I, S>(mut self, path: impl Into<String>, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TraceSelector>,
    {
        self.entries
            .entry(path.into())
            .or_default()
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn enabled(&self, path: &str, kind: TraceKind) -> bool {
        [path, WILDCARD].into_iter().any(|key| {
            self.entries
                .get(key)
                .map(|selectors| selectors.iter().any(|s| s.selects(kind)))
                .unwrap_or(false)
        })
    }
}

/// A single notification emitted by the kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub time: Time,
    pub path: String,
    pub kind: TraceKind,
    /// Phase of the model when the event happened, if it is an atomic model.
    pub phase: Option<Phase>,
    /// Short result: new phase, `(cont)`, time advance, select winner, variable name.
    pub outcome: String,
    pub payload: Value,
}

impl TraceEvent {
    pub fn new(time: Time, path: &str, kind: TraceKind) -> Self {
        Self {
            time,
            path: path.to_string(),
            kind,
            phase: None,
            outcome: String::new(),
            payload: Value::Null,
        }
    }

    pub fn with_phase(mut self, phase: &Phase) -> Self {
        self.phase = Some(phase.clone());
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = outcome.into();
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Destination of trace notifications.
pub trait TraceSink {
    fn record(&mut self, event: &TraceEvent);
}

/// Keeps every event in memory.
impl TraceSink for Vec<TraceEvent> {
    fn record(&mut self, event: &TraceEvent) {
        self.push(event.clone());
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: &TraceEvent) {}
}

/// Writes one formatted line per event to the `cdevs::trace` log target.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    pub path_width: usize,
    pub phase_width: usize,
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            path_width: DEFAULT_PATH_WIDTH,
            phase_width: DEFAULT_PHASE_WIDTH,
        }
    }
}

impl LogSink {
    pub fn new(path_width: usize, phase_width: usize) -> Self {
        Self {
            path_width,
            phase_width,
        }
    }

    pub fn format(&self, event: &TraceEvent) -> String {
        let phase = match (&event.phase, event.kind) {
            (_, TraceKind::Select) => ".".repeat(self.phase_width),
            (Some(phase), _) => phase.to_string(),
            (None, _) => "None".to_string(),
        };
        let mut line = format!(
            "t:{} {:pw$}{}({:sw$}) -> {}",
            event.time,
            shrink(self.path_width, &event.path),
            event.kind.tag(),
            phase,
            event.outcome,
            pw = self.path_width,
            sw = self.phase_width,
        );
        if !event.payload.is_null() {
            line.push(' ');
            line.push_str(&event.payload.to_string());
        }
        line
    }
}

impl TraceSink for LogSink {
    fn record(&mut self, event: &TraceEvent) {
        log::info!(target: "cdevs::trace", "{}", self.format(event));
    }
}

/// Keep the tail of a path that does not fit its column.
fn shrink(max_width: usize, path: &str) -> String {
    let length = path.chars().count();
    if length <= max_width || max_width <= 3 {
        return path.to_string();
    }
    let tail: String = path.chars().skip(length - (max_width - 3)).collect();
    format!("...{tail}")
}
