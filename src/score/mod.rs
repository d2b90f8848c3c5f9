//! Scoring strategies: turn a result list into a single 0-100 number.
//!
//! Skipped results never count. Every strategy scores an empty list as 0.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleCheckError};
use crate::result::CheckResult;

/// Policy converting results into a score in `[0, 100]`.
pub trait ScoreStrategy: Send + Sync {
    /// Canonical factory name, e.g. `"by_result"`.
    fn name(&self) -> &'static str;

    fn score(&self, results: &[CheckResult]) -> f64;
}

fn scored(results: &[CheckResult]) -> impl Iterator<Item = &CheckResult> {
    results.iter().filter(|r| !r.skipped)
}

fn passed(result: &CheckResult) -> bool {
    result.status == Some(true)
}

fn by_function(results: &[CheckResult]) -> IndexMap<&str, Vec<&CheckResult>> {
    let mut groups: IndexMap<&str, Vec<&CheckResult>> = IndexMap::new();
    for result in scored(results) {
        groups.entry(result.func_name.as_str()).or_default().push(result);
    }
    groups
}

fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        100.0 * numerator / denominator
    } else {
        0.0
    }
}

/// Passing weight over total weight, across all results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreByResult;

impl ScoreStrategy for ScoreByResult {
    fn name(&self) -> &'static str {
        "by_result"
    }

    fn score(&self, results: &[CheckResult]) -> f64 {
        let (pass, total) = scored(results).fold((0.0, 0.0), |(p, t), r| {
            (if passed(r) { p + r.weight } else { p }, t + r.weight)
        });
        percent(pass, total)
    }
}

/// Each function counts once, with its weight, and only if all its results passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreByFunctionBinary;

impl ScoreStrategy for ScoreByFunctionBinary {
    fn name(&self) -> &'static str {
        "by_function_binary"
    }

    fn score(&self, results: &[CheckResult]) -> f64 {
        let (pass, total) = by_function(results)
            .values()
            .fold((0.0, 0.0), |(p, t), group| {
                let weight = group.first().map_or(0.0, |r| r.weight);
                let ok = group.iter().all(|r| passed(r));
                (if ok { p + weight } else { p }, t + weight)
            });
        percent(pass, total)
    }
}

/// Each function contributes its pass ratio, weighted by its total result weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreByFunctionMean;

impl ScoreStrategy for ScoreByFunctionMean {
    fn name(&self) -> &'static str {
        "by_function_mean"
    }

    #[allow(clippy::cast_precision_loss)]
    fn score(&self, results: &[CheckResult]) -> f64 {
        let (pass, total) = by_function(results)
            .values()
            .fold((0.0, 0.0), |(p, t), group| {
                let weight: f64 = group.iter().map(|r| r.weight).sum();
                let passes = group.iter().filter(|r| passed(r)).count();
                let mean = passes as f64 / group.len() as f64;
                (p + mean * weight, t + weight)
            });
        percent(pass, total)
    }
}

/// 100 if any result passed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreBinaryPass;

impl ScoreStrategy for ScoreBinaryPass {
    fn name(&self) -> &'static str {
        "by_binary_pass"
    }

    fn score(&self, results: &[CheckResult]) -> f64 {
        if scored(results).any(passed) {
            100.0
        } else {
            0.0
        }
    }
}

/// 100 if there are results and none failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreBinaryFail;

impl ScoreStrategy for ScoreBinaryFail {
    fn name(&self) -> &'static str {
        "by_binary_fail"
    }

    fn score(&self, results: &[CheckResult]) -> f64 {
        let mut scored = scored(results).peekable();
        if scored.peek().is_none() {
            return 0.0;
        }
        if scored.all(passed) { 100.0 } else { 0.0 }
    }
}

/// Named strategy selector used by configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyKind {
    #[default]
    ByResult,
    ByFunctionBinary,
    ByFunctionMean,
    BinaryPass,
    BinaryFail,
}

impl StrategyKind {
    #[must_use]
    pub fn strategy(self) -> Box<dyn ScoreStrategy> {
        match self {
            Self::ByResult => Box::new(ScoreByResult),
            Self::ByFunctionBinary => Box::new(ScoreByFunctionBinary),
            Self::ByFunctionMean => Box::new(ScoreByFunctionMean),
            Self::BinaryPass => Box::new(ScoreBinaryPass),
            Self::BinaryFail => Box::new(ScoreBinaryFail),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ByResult => "by_result",
            Self::ByFunctionBinary => "by_function_binary",
            Self::ByFunctionMean => "by_function_mean",
            Self::BinaryPass => "by_binary_pass",
            Self::BinaryFail => "by_binary_fail",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = RuleCheckError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "byresult" | "scorebyresult" => Ok(Self::ByResult),
            "byfunctionbinary" | "scorebyfunctionbinary" => Ok(Self::ByFunctionBinary),
            "byfunctionmean" | "scorebyfunctionmean" => Ok(Self::ByFunctionMean),
            "bybinarypass" | "binarypass" | "scorebinarypass" => Ok(Self::BinaryPass),
            "bybinaryfail" | "binaryfail" | "scorebinaryfail" => Ok(Self::BinaryFail),
            _ => Err(RuleCheckError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for StrategyKind {
    type Error = RuleCheckError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrategyKind> for String {
    fn from(kind: StrategyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a strategy by case-insensitive name or alias.
///
/// # Errors
/// Returns `UnknownStrategy` for names that match no strategy.
pub fn strategy_factory(name: &str) -> Result<Box<dyn ScoreStrategy>> {
    Ok(name.parse::<StrategyKind>()?.strategy())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
