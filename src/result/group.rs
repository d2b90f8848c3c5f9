use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{Result, RuleCheckError};

use super::CheckResult;

/// Result attribute usable as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Tag,
    Level,
    Phase,
    Ruid,
    FuncName,
    ModuleName,
    PkgName,
    Status,
}

impl GroupKey {
    fn value_of(self, result: &CheckResult) -> String {
        match self {
            Self::Tag => result.tag.clone(),
            Self::Level => result.level.to_string(),
            Self::Phase => result.phase.clone(),
            Self::Ruid => result.ruid.clone(),
            Self::FuncName => result.func_name.clone(),
            Self::ModuleName => result.module_name.clone(),
            Self::PkgName => result.pkg_name.clone(),
            Self::Status => match result.status {
                Some(true) => "pass".to_string(),
                Some(false) => "fail".to_string(),
                None => "skip".to_string(),
            },
        }
    }
}

impl FromStr for GroupKey {
    type Err = RuleCheckError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tag" => Ok(Self::Tag),
            "level" => Ok(Self::Level),
            "phase" => Ok(Self::Phase),
            "ruid" => Ok(Self::Ruid),
            "func_name" | "function" => Ok(Self::FuncName),
            "module_name" | "module" => Ok(Self::ModuleName),
            "pkg_name" | "package" => Ok(Self::PkgName),
            "status" => Ok(Self::Status),
            _ => Err(RuleCheckError::Config(format!("Unknown group key: {s}"))),
        }
    }
}

/// Results grouped by one or more keys, sorted by key value at every depth.
#[derive(Debug, Clone)]
pub enum Grouped {
    Leaf(Vec<CheckResult>),
    Nested(BTreeMap<String, Grouped>),
}

impl Grouped {
    /// Child group for `key`, if this is a nested level.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Nested(map) => map.get(key),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Nested(map) => map.keys().map(String::as_str).collect(),
            Self::Leaf(_) => Vec::new(),
        }
    }

    /// Results at a leaf level, `None` for nested levels.
    #[must_use]
    pub fn results(&self) -> Option<&[CheckResult]> {
        match self {
            Self::Leaf(results) => Some(results),
            Self::Nested(_) => None,
        }
    }
}

/// Groups `results` by `keys`, outermost key first.
///
/// # Errors
/// Returns an error if `keys` is empty.
pub fn group_by(results: &[CheckResult], keys: &[GroupKey]) -> Result<Grouped> {
    let Some((&key, rest)) = keys.split_first() else {
        return Err(RuleCheckError::Config(
            "Empty key list for grouping results.".to_string(),
        ));
    };

    let mut buckets: BTreeMap<String, Vec<CheckResult>> = BTreeMap::new();
    for result in results {
        buckets
            .entry(key.value_of(result))
            .or_default()
            .push(result.clone());
    }

    let mut grouped = BTreeMap::new();
    for (value, members) in buckets {
        let child = if rest.is_empty() {
            Grouped::Leaf(members)
        } else {
            group_by(&members, rest)?
        };
        grouped.insert(value, child);
    }
    Ok(Grouped::Nested(grouped))
}
