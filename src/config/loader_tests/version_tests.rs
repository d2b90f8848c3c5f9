//! Tests for config version field validation.

use std::path::Path;

use crate::config::{ConfigLoader, FileConfigLoader};
use crate::error::RuleCheckError;

use super::mock_fs::MockFileSystem;

#[test]
fn config_with_valid_version_loads_successfully() {
    let fs = MockFileSystem::new().with_file("/config.toml", "version = \"1\"\nauto_ruid = true\n");

    let config = FileConfigLoader::with_fs(fs)
        .load_from_path(Path::new("/config.toml"))
        .unwrap();

    assert_eq!(config.version, Some("1".to_string()));
    assert!(config.auto_ruid);
}

#[test]
fn config_without_version_loads_successfully() {
    let fs = MockFileSystem::new().with_file("/config.toml", "auto_ruid = true\n");

    let config = FileConfigLoader::with_fs(fs)
        .load_from_path(Path::new("/config.toml"))
        .unwrap();

    assert_eq!(config.version, None);
}

#[test]
fn config_with_unsupported_version_fails() {
    let fs = MockFileSystem::new().with_file("/config.toml", "version = \"9\"\n");

    let err = FileConfigLoader::with_fs(fs)
        .load_from_path(Path::new("/config.toml"))
        .unwrap_err();

    assert!(matches!(err, RuleCheckError::Config(_)));
    assert!(err.to_string().contains("Unsupported config version '9'"));
}
