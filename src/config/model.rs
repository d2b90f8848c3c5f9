use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::render::RenderStyle;
use crate::rule_control::RuleControlSpec;
use crate::score::StrategyKind;

/// Supported config version.
pub const CONFIG_VERSION: &str = "1";

/// Checker settings read from `rulecheck.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckerConfig {
    /// Config schema version. Missing means the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Stop the whole run at the first failing result.
    #[serde(default)]
    pub abort_on_fail: bool,

    /// Stop the whole run at the first result carrying an error.
    #[serde(default)]
    pub abort_on_exception: bool,

    /// Generate rule ids for functions that have none.
    #[serde(default)]
    pub auto_ruid: bool,

    /// Scoring strategy name, e.g. `by_result` or `ScoreBinaryFail`.
    #[serde(default)]
    pub score_strategy: StrategyKind,

    #[serde(default)]
    pub renderer: RenderStyle,

    /// Inline rule control. Mutually exclusive with `rule_control_file`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_control: Option<RuleControlSpec>,

    /// Rule-control source file, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_control_file: Option<PathBuf>,

    /// Section of `rule_control_file` to read. Empty or missing selects the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_control_section: Option<String>,
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
