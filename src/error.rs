use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleCheckError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid attribute {name}='{value}': {reason}")]
    InvalidAttribute {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate RUIDs found in {scope}: {}", ruids.join(", "))]
    DuplicateRuids { scope: String, ruids: Vec<String> },

    #[error("There are duplicate or missing RUIDS: {0}")]
    RuidIssues(String),

    #[error("Check function '{function}' requires parameter '{parameter}' which is not in the environment")]
    MissingParameter { function: String, parameter: String },

    #[error("Invalid parameter list: {0}")]
    InvalidParameter(String),

    #[error("Invalid rule-control pattern: {pattern}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Rule-control source {path}: {reason}")]
    RuleControlSource { path: PathBuf, reason: String },

    #[error("Unknown scoring strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    #[error("Environment function '{name}' failed: {message}")]
    EnvFunction { name: String, message: String },

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleCheckError {
    /// Short category name used in machine-readable error output.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::InvalidAttribute { .. } | Self::InvalidParameter(_) => "Config",
            Self::DuplicateRuids { .. } | Self::RuidIssues(_) => "Ruid",
            Self::MissingParameter { .. } | Self::EnvFunction { .. } => "Environment",
            Self::InvalidRegex { .. } | Self::RuleControlSource { .. } => "RuleControl",
            Self::UnknownStrategy(_) | Self::UnknownRenderer(_) => "Lookup",
            Self::FileRead { .. } | Self::Io(_) => "IO",
            Self::TomlParse(_) | Self::Json(_) => "Parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleCheckError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
