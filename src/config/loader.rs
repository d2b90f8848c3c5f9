use std::path::{Path, PathBuf};

use crate::error::{Result, RuleCheckError};

use super::filesystem::{FileSystem, RealFileSystem};
use super::model::{CONFIG_VERSION, CheckerConfig};

/// Loads checker configuration.
pub trait ConfigLoader {
    /// Load configuration from the default location.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    fn load(&self) -> Result<CheckerConfig>;

    /// Load configuration from a specific path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load_from_path(&self, path: &Path) -> Result<CheckerConfig>;
}

pub const LOCAL_CONFIG_NAME: &str = "rulecheck.toml";

fn validate_config_version(config: &CheckerConfig) -> Result<()> {
    match &config.version {
        None => Ok(()),
        Some(v) if v == CONFIG_VERSION => Ok(()),
        Some(v) => Err(RuleCheckError::Config(format!(
            "Unsupported config version '{v}'. Only version '{CONFIG_VERSION}' is supported."
        ))),
    }
}

fn validate_rule_control(config: &CheckerConfig) -> Result<()> {
    if config.rule_control.is_some() && config.rule_control_file.is_some() {
        return Err(RuleCheckError::Config(
            "'rule_control' and 'rule_control_file' cannot both be set".to_string(),
        ));
    }
    if config.rule_control_section.is_some() && config.rule_control_file.is_none() {
        return Err(RuleCheckError::Config(
            "'rule_control_section' requires 'rule_control_file'".to_string(),
        ));
    }
    Ok(())
}

/// Loads configuration from the filesystem.
///
/// Search order:
/// 1. `rulecheck.toml` in the current directory
/// 2. `CheckerConfig::default()`
#[derive(Debug)]
pub struct FileConfigLoader<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl Default for FileConfigLoader<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConfigLoader<RealFileSystem> {
    #[must_use]
    pub const fn new() -> Self {
        Self { fs: RealFileSystem }
    }
}

impl<F: FileSystem> FileConfigLoader<F> {
    #[must_use]
    pub const fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    fn local_config_path(&self) -> Option<PathBuf> {
        self.fs
            .current_dir()
            .ok()
            .map(|dir| dir.join(LOCAL_CONFIG_NAME))
    }

    fn parse_config(content: &str) -> Result<CheckerConfig> {
        let config: CheckerConfig = toml::from_str(content)?;
        validate_config_version(&config)?;
        validate_rule_control(&config)?;
        Ok(config)
    }
}

impl<F: FileSystem> ConfigLoader for FileConfigLoader<F> {
    fn load(&self) -> Result<CheckerConfig> {
        match self.local_config_path() {
            Some(path) if self.fs.exists(&path) => self.load_from_path(&path),
            _ => {
                tracing::debug!("no {LOCAL_CONFIG_NAME} found, using defaults");
                Ok(CheckerConfig::default())
            }
        }
    }

    fn load_from_path(&self, path: &Path) -> Result<CheckerConfig> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|source| RuleCheckError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::parse_config(&content)?;

        if let (Some(file), Some(dir)) = (&config.rule_control_file, path.parent())
            && file.is_relative()
        {
            config.rule_control_file = Some(dir.join(file));
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
#[path = "loader_tests/mod.rs"]
mod tests;
