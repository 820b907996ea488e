//! Run configuration loaded from TOML.
//!
//! ```toml
//! end_time = 10.0
//! strict_select = false
//!
//! [root]
//! module = "procgen"
//! class = "GeneratorProcessor"
//! name = "top"
//! init = { period = 2.0, service_time = 3.0, generators = 2 }
//!
//! [trace]
//! path_width = 17
//! filters = { "/top/proc" = ["*"], "*" = ["select"] }
//! ```

use crate::descriptor::ModelDescriptor;
use crate::errors::DevsResult;
use crate::time::Time;
use crate::trace::{LogSink, TraceFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PATH_WIDTH: usize = 17;
pub const DEFAULT_PHASE_WIDTH: usize = 9;

fn default_path_width() -> usize {
    DEFAULT_PATH_WIDTH
}

fn default_phase_width() -> usize {
    DEFAULT_PHASE_WIDTH
}

/// Which events are traced and how the log sink lays them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default)]
    pub filters: TraceFilter,
    #[serde(default = "default_path_width")]
    pub path_width: usize,
    #[serde(default = "default_phase_width")]
    pub phase_width: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            filters: TraceFilter::new(),
            path_width: DEFAULT_PATH_WIDTH,
            phase_width: DEFAULT_PHASE_WIDTH,
        }
    }
}

impl TraceConfig {
    pub fn sink(&self) -> LogSink {
        LogSink::new(self.path_width, self.phase_width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub end_time: Time,
    pub root: ModelDescriptor,
    #[serde(default)]
    pub strict_select: bool,
    #[serde(default)]
    pub trace: TraceConfig,
}

impl SimulationConfig {
    pub fn new(end_time: Time, root: ModelDescriptor) -> Self {
        Self {
            end_time,
            root,
            strict_select: false,
            trace: TraceConfig::default(),
        }
    }

    pub fn from_toml_str(content: &str) -> DevsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DevsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DevsError;
    use crate::trace::TraceKind;
    use serde_json::json;

    #[test]
    fn test_parse_full_config() {
        let config = SimulationConfig::from_toml_str(
            r#"
end_time = 10.0
strict_select = true

[root]
module = "procgen"
class = "GeneratorProcessor"
name = "top"
init = { period = 2.0, service_time = 3.0, generators = 2 }

[trace]
path_width = 20
filters = { "/top/proc" = ["*"], "*" = ["select", "ta"] }
"#,
        )
        .unwrap();

        assert_eq!(config.end_time, 10.0);
        assert!(config.strict_select);
        assert_eq!(config.root.name, "top");
        assert_eq!(config.root.init["generators"], json!(2));
        assert_eq!(config.trace.path_width, 20);
        assert_eq!(config.trace.phase_width, DEFAULT_PHASE_WIDTH);

        let filters = &config.trace.filters;
        assert!(filters.enabled("/top/proc", TraceKind::State));
        assert!(filters.enabled("/top/gen:0", TraceKind::TimeAdvance));
        assert!(!filters.enabled("/top/gen:0", TraceKind::Internal));
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
end_time = 5
root = { module = "cdevs", class = "CoupledSpec", name = "top" }
"#,
        )
        .unwrap();

        assert!(!config.strict_select);
        assert_eq!(config.trace, TraceConfig::default());
        assert!(config.trace.filters.is_empty());
        assert_eq!(config.root.count, 1);
    }

    #[test]
    fn test_unknown_trace_kind_is_rejected() {
        let res = SimulationConfig::from_toml_str(
            r#"
end_time = 5.0
root = { module = "cdevs", class = "CoupledSpec", name = "top" }
trace = { filters = { "*" = ["everything"] } }
"#,
        );
        assert!(matches!(res, Err(DevsError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let res = SimulationConfig::from_file("/nonexistent/cdevs.toml");
        assert!(matches!(res, Err(DevsError::Io(_))));
    }
}
