//! Tie-breaking among simultaneously imminent submodels.
//!
//! A rule matches a set of imminent names when its candidate patterns can be
//! assigned to distinct names and every name is matched by at least one
//! pattern. Rules are tried in declaration order; the first match picks the
//! lexically smallest imminent name accepted by its winner pattern.

use crate::errors::SpecificationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Above this many instances the conflict sets are not enumerated at build time.
pub const MAX_ENUMERATED_INSTANCES: usize = 12;

/// A declared select rule, before its patterns are compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRuleDecl {
    pub candidates: Vec<String>,
    pub winner: String,
}

impl SelectRuleDecl {
    pub fn new<I, S>(candidates: I, winner: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
            winner: winner.into(),
        }
    }
}

/// A regular expression that must match a whole instance name.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: &str) -> Result<Self, SpecificationError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            SpecificationError::InvalidPattern {
                pattern: pattern.to_string(),
                details: e.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone)]
pub struct SelectRule {
    candidates: Vec<NamePattern>,
    winner: NamePattern,
}

impl SelectRule {
    pub fn compile(decl: &SelectRuleDecl) -> Result<Self, SpecificationError> {
        let candidates = decl
            .candidates
            .iter()
            .map(|p| NamePattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            candidates,
            winner: NamePattern::new(&decl.winner)?,
        })
    }

    pub fn candidates(&self) -> &[NamePattern] {
        &self.candidates
    }

    pub fn winner(&self) -> &NamePattern {
        &self.winner
    }

    /// Whether this rule applies to exactly this set of imminent names.
    pub fn matches(&self, imminent: &[&str]) -> bool {
        self.candidates.len() <= imminent.len()
            && imminent
                .iter()
                .all(|name| self.candidates.iter().any(|p| p.matches(name)))
            && assign_distinct(&self.candidates, imminent)
    }

    /// The first of `imminent` accepted by the winner pattern.
    pub fn pick<'a>(&self, imminent: &[&'a str]) -> Option<&'a str> {
        imminent
            .iter()
            .copied()
            .find(|name| self.winner.matches(name))
    }
}

/// Can every pattern be matched to its own name? (bipartite matching)
fn assign_distinct(patterns: &[NamePattern], names: &[&str]) -> bool {
    let mut owner: Vec<Option<usize>> = vec![None; names.len()];
    (0..patterns.len()).all(|pattern| {
        let mut visited = vec![false; names.len()];
        augment(pattern, patterns, names, &mut owner, &mut visited)
    })
}

fn augment(
    pattern: usize,
    patterns: &[NamePattern],
    names: &[&str],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for (i, name) in names.iter().enumerate() {
        if visited[i] || !patterns[pattern].matches(name) {
            continue;
        }
        visited[i] = true;
        let free = match owner[i] {
            None => true,
            Some(other) => augment(other, patterns, names, owner, visited),
        };
        if free {
            owner[i] = Some(pattern);
            return true;
        }
    }
    false
}

/// Why a set of imminent names could not be narrowed to a single winner.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectFailure {
    NoMatchingRule,
    WinnerNotImminent { rule: usize, pattern: String },
}

impl fmt::Display for SelectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectFailure::NoMatchingRule => f.write_str("no select rule matches"),
            SelectFailure::WinnerNotImminent { rule, pattern } => write!(
                f,
                "select rule {rule} matched but its winner '{pattern}' is not imminent"
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectResolver {
    rules: Vec<SelectRule>,
}

impl SelectResolver {
    pub fn new(rules: Vec<SelectRule>) -> Self {
        Self { rules }
    }

    pub fn compile(decls: &[SelectRuleDecl]) -> Result<Self, SpecificationError> {
        let rules = decls
            .iter()
            .map(SelectRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[SelectRule] {
        &self.rules
    }

    /// Pick the single imminent submodel allowed to transition.
    ///
    /// The answer depends only on the set of names, not their order.
    pub fn resolve<'a>(&self, imminent: &[&'a str]) -> Result<&'a str, SelectFailure> {
        let mut names = imminent.to_vec();
        names.sort_unstable();
        names.dedup();
        if let [only] = names.as_slice() {
            return Ok(*only);
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.matches(&names) {
                return rule
                    .pick(&names)
                    .ok_or_else(|| SelectFailure::WinnerNotImminent {
                        rule: index,
                        pattern: rule.winner.to_string(),
                    });
            }
        }
        Err(SelectFailure::NoMatchingRule)
    }

    /// Winner patterns that match none of the declared instances.
    pub fn unreachable_winners(&self, instances: &[String]) -> Vec<&NamePattern> {
        self.rules
            .iter()
            .map(|rule| &rule.winner)
            .filter(|winner| !instances.iter().any(|name| winner.matches(name)))
            .collect()
    }

    /// Candidate patterns that match none of the declared instances.
    pub fn unused_candidates(&self, instances: &[String]) -> Vec<&NamePattern> {
        self.rules
            .iter()
            .flat_map(|rule| rule.candidates.iter())
            .filter(|pattern| !instances.iter().any(|name| pattern.matches(name)))
            .collect()
    }

    /// Every conflict set of two or more instances the rules cannot resolve.
    ///
    /// Returns `None` when there are too many instances to enumerate.
    pub fn uncovered_conflicts(&self, instances: &[String]) -> Option<Vec<Vec<String>>> {
        if instances.len() > MAX_ENUMERATED_INSTANCES {
            return None;
        }
        let mut sorted: Vec<&str> = instances.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut uncovered = vec![];
        for mask in 1u32..(1 << sorted.len()) {
            if mask.count_ones() < 2 {
                continue;
            }
            let subset: Vec<&str> = sorted
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| *name)
                .collect();
            if self.resolve(&subset).is_err() {
                uncovered.push(subset.iter().map(|s| s.to_string()).collect());
            }
        }
        Some(uncovered)
    }
}
