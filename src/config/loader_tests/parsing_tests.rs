//! Tests for config parsing and cross-field validation.

use std::path::Path;

use crate::config::{ConfigLoader, FileConfigLoader};
use crate::error::RuleCheckError;
use crate::score::StrategyKind;

use super::mock_fs::MockFileSystem;

fn load(content: &str) -> crate::error::Result<crate::config::CheckerConfig> {
    let fs = MockFileSystem::new().with_file("/config.toml", content);
    FileConfigLoader::with_fs(fs).load_from_path(Path::new("/config.toml"))
}

#[test]
fn parses_strategy_by_alias() {
    let config = load("score_strategy = \"by-function-mean\"\n").unwrap();
    assert_eq!(config.score_strategy, StrategyKind::ByFunctionMean);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = load("abort_on_fail = \n").unwrap_err();
    assert!(matches!(err, RuleCheckError::TomlParse(_)));
}

#[test]
fn inline_and_file_rule_control_are_exclusive() {
    let err = load("rule_control_file = \"rc.toml\"\n[rule_control]\ntags = \"t1\"\n").unwrap_err();
    assert!(matches!(err, RuleCheckError::Config(_)));
    assert!(err.to_string().contains("cannot both be set"));
}

#[test]
fn section_requires_a_file() {
    let err = load("rule_control_section = \"prod\"\n").unwrap_err();
    assert!(err.to_string().contains("requires 'rule_control_file'"));
}
