//! Rule-control: configuration-driven narrowing of which checks run.
//!
//! Four categories (tags, ruids, phases, levels) each hold regex patterns,
//! anchored to match the whole attribute. A pattern prefixed with `-` excludes
//! matching functions; a bare or `+`-prefixed pattern includes them. A function
//! is kept iff, in every category with inclusions, it matches at least one
//! inclusion, and it matches no exclusion in any category. Levels are matched
//! against their decimal text.

mod source;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleCheckError};
use crate::function::CheckFunction;

pub use source::{RcFormat, load_rule_control, load_rule_control_spec, parse_rule_control_spec};

/// A category value as written in configuration: one string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    Text(String),
    Number(i64),
    List(Vec<PatternEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    Text(String),
    Number(i64),
}

impl Patterns {
    /// Flattens into individual patterns; a single string splits on whitespace.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        match self {
            Self::Text(text) => text.split_whitespace().map(ToString::to_string).collect(),
            Self::Number(n) => vec![n.to_string()],
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    PatternEntry::Text(t) => t.trim().to_string(),
                    PatternEntry::Number(n) => n.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Raw rule-control data with optional categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleControlSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Patterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruids: Option<Patterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Patterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Patterns>,
}

/// Compiled patterns for one category.
#[derive(Debug, Clone, Default)]
pub struct CategoryRules {
    include: Vec<(String, Regex)>,
    exclude: Vec<(String, Regex)>,
}

/// Serializable, normalized view of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| RuleCheckError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

impl CategoryRules {
    fn from_patterns(patterns: Option<&Patterns>) -> Result<Self> {
        let mut rules = Self::default();
        for entry in patterns.map(Patterns::entries).unwrap_or_default() {
            if let Some(pattern) = entry.strip_prefix('-') {
                rules.exclude.push((pattern.to_string(), compile(pattern)?));
            } else {
                let pattern = entry.strip_prefix('+').unwrap_or(&entry);
                rules.include.push((pattern.to_string(), compile(pattern)?));
            }
        }
        Ok(rules)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|(_, re)| re.is_match(value));
        included && !self.exclude.iter().any(|(_, re)| re.is_match(value))
    }

    #[must_use]
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            include: self.include.iter().map(|(p, _)| p.clone()).collect(),
            exclude: self.exclude.iter().map(|(p, _)| p.clone()).collect(),
        }
    }
}

/// Normalized, compiled rule-control. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct RuleControl {
    tags: CategoryRules,
    ruids: CategoryRules,
    phases: CategoryRules,
    levels: CategoryRules,
}

/// Serializable summary of a [`RuleControl`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleControlSummary {
    pub tags: CategorySummary,
    pub ruids: CategorySummary,
    pub phases: CategorySummary,
    pub levels: CategorySummary,
}

impl RuleControl {
    /// Rule-control with no constraints; matches everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles raw rule-control data.
    ///
    /// # Errors
    /// Returns `InvalidRegex` for a pattern that does not compile.
    pub fn from_spec(spec: &RuleControlSpec) -> Result<Self> {
        Ok(Self {
            tags: CategoryRules::from_patterns(spec.tags.as_ref())?,
            ruids: CategoryRules::from_patterns(spec.ruids.as_ref())?,
            phases: CategoryRules::from_patterns(spec.phases.as_ref())?,
            levels: CategoryRules::from_patterns(spec.levels.as_ref())?,
        })
    }

    /// Compiles rule-control from an in-memory JSON value such as
    /// `{"tags": "t1 t2", "levels": [1, 2]}`.
    ///
    /// # Errors
    /// Returns an error if the value has the wrong shape or a pattern is invalid.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let spec: RuleControlSpec = serde_json::from_value(value)?;
        Self::from_spec(&spec)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
            && self.ruids.is_empty()
            && self.phases.is_empty()
            && self.levels.is_empty()
    }

    #[must_use]
    pub fn does_match(&self, tag: &str, ruid: &str, phase: &str, level: u32) -> bool {
        self.tags.matches(tag)
            && self.ruids.matches(ruid)
            && self.phases.matches(phase)
            && self.levels.matches(&level.to_string())
    }

    #[must_use]
    pub fn matches(&self, function: &CheckFunction) -> bool {
        self.does_match(
            function.tag(),
            function.ruid(),
            function.phase(),
            function.level(),
        )
    }

    #[must_use]
    pub const fn tags(&self) -> &CategoryRules {
        &self.tags
    }

    #[must_use]
    pub const fn ruids(&self) -> &CategoryRules {
        &self.ruids
    }

    #[must_use]
    pub const fn phases(&self) -> &CategoryRules {
        &self.phases
    }

    #[must_use]
    pub const fn levels(&self) -> &CategoryRules {
        &self.levels
    }

    #[must_use]
    pub fn summary(&self) -> RuleControlSummary {
        RuleControlSummary {
            tags: self.tags.summary(),
            ruids: self.ruids.summary(),
            phases: self.phases.summary(),
            levels: self.levels.summary(),
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
