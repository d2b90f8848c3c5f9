//! Check results and helpers for summarizing them.

mod group;
mod tally;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use group::{GroupKey, Grouped, group_by};
pub use tally::{ResultTally, Tracked};

/// One reported outcome of a check function.
///
/// `status` is tri-state: `Some(true)` pass, `Some(false)` fail, `None` for
/// skipped results. A result carrying `except` always has `status == Some(false)`.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub status: Option<bool>,

    pub func_name: String,
    pub module_name: String,
    pub pkg_name: String,

    pub msg: String,
    pub info_msg: String,
    pub warn_msg: String,
    pub msg_rendered: String,

    pub doc: String,
    pub runtime_sec: f64,

    pub except: Option<Arc<anyhow::Error>>,
    pub traceback: String,
    pub skipped: bool,

    pub weight: f64,
    pub tag: String,
    pub level: u32,
    pub phase: String,
    pub count: usize,
    pub ruid: String,
    pub ttl_minutes: f64,

    pub mitigation: String,
    pub owners: Vec<String>,

    /// Marks an aggregated result produced by [`ResultTally::summarize`].
    pub summary_result: bool,
}

impl Default for CheckResult {
    fn default() -> Self {
        Self {
            status: Some(false),
            func_name: String::new(),
            module_name: String::new(),
            pkg_name: String::new(),
            msg: String::new(),
            info_msg: String::new(),
            warn_msg: String::new(),
            msg_rendered: String::new(),
            doc: String::new(),
            runtime_sec: 0.0,
            except: None,
            traceback: String::new(),
            skipped: false,
            weight: 100.0,
            tag: String::new(),
            level: 1,
            phase: String::new(),
            count: 0,
            ruid: String::new(),
            ttl_minutes: 0.0,
            mitigation: String::new(),
            owners: Vec::new(),
            summary_result: false,
        }
    }
}

impl CheckResult {
    #[must_use]
    pub fn new(status: bool, msg: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            msg: msg.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn pass(msg: impl Into<String>) -> Self {
        Self::new(true, msg)
    }

    #[must_use]
    pub fn fail(msg: impl Into<String>) -> Self {
        Self::new(false, msg)
    }

    /// A skipped result: neither pass nor fail.
    #[must_use]
    pub fn skip(msg: impl Into<String>) -> Self {
        Self {
            status: None,
            skipped: true,
            msg: msg.into(),
            ..Self::default()
        }
    }

    /// A failing result carrying a captured error.
    #[must_use]
    pub fn error(msg: impl Into<String>, err: anyhow::Error, traceback: String) -> Self {
        Self {
            status: Some(false),
            msg: msg.into(),
            except: Some(Arc::new(err)),
            traceback,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info_msg = info.into();
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warn: impl Into<String>) -> Self {
        self.warn_msg = warn.into();
        self
    }

    // Predicate methods

    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self.status, Some(true)) && !self.skipped
    }

    #[must_use]
    pub const fn is_fail(&self) -> bool {
        !matches!(self.status, Some(true)) && !self.skipped
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.except.is_some()
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.warn_msg.is_empty()
    }

    /// Flat, serializable view with the exception stringified.
    #[must_use]
    pub fn as_record(&self) -> ResultRecord {
        ResultRecord {
            status: self.status,
            func_name: self.func_name.clone(),
            module_name: self.module_name.clone(),
            pkg_name: self.pkg_name.clone(),
            msg: self.msg.clone(),
            info_msg: self.info_msg.clone(),
            warn_msg: self.warn_msg.clone(),
            msg_rendered: self.msg_rendered.clone(),
            doc: self.doc.clone(),
            runtime_sec: self.runtime_sec,
            except: self.except.as_ref().map(ToString::to_string),
            traceback: self.traceback.clone(),
            skipped: self.skipped,
            weight: self.weight,
            tag: self.tag.clone(),
            level: self.level,
            phase: self.phase.clone(),
            count: self.count,
            ruid: self.ruid.clone(),
            ttl_minutes: self.ttl_minutes,
            mitigation: self.mitigation.clone(),
            owners: self.owners.clone(),
            summary_result: self.summary_result,
        }
    }
}

/// Serialized form of a [`CheckResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultRecord {
    pub status: Option<bool>,
    pub func_name: String,
    pub module_name: String,
    pub pkg_name: String,
    pub msg: String,
    pub info_msg: String,
    pub warn_msg: String,
    pub msg_rendered: String,
    pub doc: String,
    pub runtime_sec: f64,
    pub except: Option<String>,
    pub traceback: String,
    pub skipped: bool,
    pub weight: f64,
    pub tag: String,
    pub level: u32,
    pub phase: String,
    pub count: usize,
    pub ruid: String,
    pub ttl_minutes: f64,
    pub mitigation: String,
    pub owners: Vec<String>,
    pub summary_result: bool,
}

impl Default for ResultRecord {
    fn default() -> Self {
        CheckResult::default().as_record()
    }
}

impl From<ResultRecord> for CheckResult {
    fn from(record: ResultRecord) -> Self {
        Self {
            status: record.status,
            func_name: record.func_name,
            module_name: record.module_name,
            pkg_name: record.pkg_name,
            msg: record.msg,
            info_msg: record.info_msg,
            warn_msg: record.warn_msg,
            msg_rendered: record.msg_rendered,
            doc: record.doc,
            runtime_sec: record.runtime_sec,
            except: record.except.map(|e| Arc::new(anyhow::anyhow!(e))),
            traceback: record.traceback,
            skipped: record.skipped,
            weight: record.weight,
            tag: record.tag,
            level: record.level,
            phase: record.phase,
            count: record.count,
            ruid: record.ruid,
            ttl_minutes: record.ttl_minutes,
            mitigation: record.mitigation,
            owners: record.owners,
            summary_result: record.summary_result,
        }
    }
}

/// Per-outcome counts, classified with priority skip > error > fail > warn > pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub warned: usize,
}

impl Overview {
    #[must_use]
    pub fn from_results(results: &[CheckResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                if r.skipped {
                    acc.skipped += 1;
                } else if r.is_error() {
                    acc.errors += 1;
                } else if r.status != Some(true) {
                    acc.failed += 1;
                } else if r.is_warning() {
                    acc.warned += 1;
                } else {
                    acc.passed += 1;
                }
                acc
            },
        )
    }
}

impl std::fmt::Display for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {}, Passed: {}, Failed: {}, Errors: {}, Skipped: {}, Warned: {}",
            self.total, self.passed, self.failed, self.errors, self.skipped, self.warned
        )
    }
}

/// One-line summary of a result list.
#[must_use]
pub fn overview(results: &[CheckResult]) -> String {
    Overview::from_results(results).to_string()
}

// Result transformers: return the result (possibly modified) to keep it, `None` to drop it.

#[must_use]
pub fn passes_only(result: CheckResult) -> Option<CheckResult> {
    (result.status == Some(true)).then_some(result)
}

#[must_use]
pub fn fails_only(result: CheckResult) -> Option<CheckResult> {
    (result.status != Some(true)).then_some(result)
}

/// Drops results tagged as informational.
#[must_use]
pub fn remove_info(result: CheckResult) -> Option<CheckResult> {
    result.info_msg.is_empty().then_some(result)
}

#[must_use]
pub fn warn_as_fail(mut result: CheckResult) -> Option<CheckResult> {
    if result.is_warning() {
        result.status = Some(false);
    }
    Some(result)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
