//! Serializable run report and its output formatters.

mod json;
mod markdown;
mod text;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleCheckError};
use crate::result::{CheckResult, Overview, ResultRecord};
use crate::rule_control::RuleControlSummary;
use crate::score::ScoreStrategy;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// What was collected for a run and how it scored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportHeader {
    pub package_count: usize,
    pub module_count: usize,
    pub modules: Vec<String>,
    pub function_count: usize,
    pub tags: Vec<String>,
    pub levels: Vec<u32>,
    pub phases: Vec<String>,
    pub ruids: Vec<String>,
    pub score: f64,
    pub score_strategy: String,
    pub env_nulls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_control: Option<RuleControlSummary>,
}

/// Full record of one run. Timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub header: ReportHeader,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default)]
    pub passed_count: usize,
    #[serde(default)]
    pub failed_count: usize,
    #[serde(default)]
    pub skip_count: usize,
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
}

impl Report {
    /// Results rebuilt from their records.
    #[must_use]
    pub fn check_results(&self) -> Vec<CheckResult> {
        self.results.iter().cloned().map(CheckResult::from).collect()
    }

    #[must_use]
    pub fn overview(&self) -> Overview {
        Overview::from_results(&self.check_results())
    }

    /// True if any non-skipped result did not pass.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|r| !r.skipped && r.status != Some(true))
    }

    /// Scores the stored results with another strategy.
    #[must_use]
    pub fn rescore(&self, strategy: &dyn ScoreStrategy) -> f64 {
        strategy.score(&self.check_results())
    }
}

/// Formats a report for display.
pub trait ReportFormatter {
    /// # Errors
    /// Returns an error if serialization fails.
    fn format(&self, report: &Report) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl ReportFormat {
    #[must_use]
    pub fn formatter(self) -> Box<dyn ReportFormatter> {
        match self {
            Self::Text => Box::new(TextFormatter),
            Self::Json => Box::new(JsonFormatter),
            Self::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

/// Reads a JSON report written by [`write_report`].
///
/// # Errors
/// Returns `FileRead` if the file cannot be read, `Json` if it is not a report.
pub fn read_report(path: &Path) -> Result<Report> {
    let content = std::fs::read_to_string(path).map_err(|source| RuleCheckError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes `report` as pretty JSON.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let json = JsonFormatter.format(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Short status label for a result record.
pub(crate) fn status_label(record: &ResultRecord) -> &'static str {
    if record.skipped {
        "SKIP"
    } else if record.except.is_some() {
        "ERROR"
    } else if record.status != Some(true) {
        "FAIL"
    } else if !record.warn_msg.is_empty() {
        "WARN"
    } else {
        "PASS"
    }
}

pub(crate) fn display_message(record: &ResultRecord) -> &str {
    if record.msg_rendered.is_empty() {
        &record.msg
    } else {
        &record.msg_rendered
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
