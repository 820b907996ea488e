//! Endpoint expressions used in coupling declarations.
//!
//! An endpoint is either `self` (the coupled model's own port), a single
//! instance name (`proc`, `proc:1`) or a half-open range over replicated
//! instances (`proc[1:3]` stands for `proc:1` and `proc:2`).

use crate::errors::SpecificationError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Name of the coupled model's own port in coupling declarations.
pub const SELF_ENDPOINT: &str = "self";

static ENDPOINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>\w+)(?::(?P<index>\d+)|\[(?P<lo>\d+):(?P<hi>\d+)\])?$")
        .expect("endpoint grammar is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRef {
    /// The coupled model itself.
    Own,
    /// A single instance.
    Instance(String),
    /// Instances `base:lo` up to, but excluding, `base:hi`.
    Range { base: String, lo: usize, hi: usize },
}

impl EndpointRef {
    pub fn parse(expr: &str) -> Result<Self, SpecificationError> {
        let expr = expr.trim();
        if expr == SELF_ENDPOINT {
            return Ok(EndpointRef::Own);
        }
        let malformed = || SpecificationError::MalformedEndpoint(expr.to_string());
        let caps = ENDPOINT_RE.captures(expr).ok_or_else(malformed)?;
        let base = &caps["base"];
        if base == SELF_ENDPOINT {
            return Err(malformed());
        }

        match (caps.name("lo"), caps.name("hi")) {
            (Some(lo), Some(hi)) => {
                let lo: usize = lo.as_str().parse().map_err(|_| malformed())?;
                let hi: usize = hi.as_str().parse().map_err(|_| malformed())?;
                if lo >= hi {
                    return Err(SpecificationError::EmptyRange {
                        base: base.to_string(),
                        lo,
                        hi,
                    });
                }
                Ok(EndpointRef::Range {
                    base: base.to_string(),
                    lo,
                    hi,
                })
            }
            _ => Ok(EndpointRef::Instance(expr.to_string())),
        }
    }

    pub fn is_own(&self) -> bool {
        matches!(self, EndpointRef::Own)
    }

    /// Concrete names denoted by this endpoint; `self` expands to itself.
    pub fn expand(&self) -> Vec<String> {
        match self {
            EndpointRef::Own => vec![SELF_ENDPOINT.to_string()],
            EndpointRef::Instance(name) => vec![name.clone()],
            EndpointRef::Range { base, lo, hi } => {
                (*lo..*hi).map(|i| format!("{base}:{i}")).collect()
            }
        }
    }
}

impl FromStr for EndpointRef {
    type Err = SpecificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRef::Own => f.write_str(SELF_ENDPOINT),
            EndpointRef::Instance(name) => f.write_str(name),
            EndpointRef::Range { base, lo, hi } => write!(f, "{base}[{lo}:{hi}]"),
        }
    }
}
