//! Rule-id (ruid) consistency helpers.

use indexmap::IndexMap;

use super::{CheckModule, CheckPackage};

/// True when nobody uses rule ids: every entry is blank.
#[must_use]
pub fn empty_ruids<S: AsRef<str>>(ruids: &[S]) -> bool {
    ruids.iter().all(|r| r.as_ref().is_empty())
}

/// True when every entry is non-blank and unique.
#[must_use]
pub fn valid_ruids<S: AsRef<str>>(ruids: &[S]) -> bool {
    !ruids.iter().any(|r| r.as_ref().is_empty()) && duplicate_ruids(ruids).is_empty()
}

/// Non-blank ids occurring more than once, in first-seen order.
#[must_use]
pub fn duplicate_ruids<S: AsRef<str>>(ruids: &[S]) -> Vec<String> {
    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for ruid in ruids {
        let ruid = ruid.as_ref();
        if !ruid.is_empty() {
            *seen.entry(ruid).or_default() += 1;
        }
    }
    seen.into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(r, _)| r.to_string())
        .collect()
}

/// Human-readable description of what is wrong with a rule-id list.
#[must_use]
pub fn ruid_issues<S: AsRef<str>>(ruids: &[S]) -> String {
    if empty_ruids(ruids) {
        return "RUIDS are not used.".to_string();
    }
    if valid_ruids(ruids) {
        return "No issues found.".to_string();
    }

    let mut issues = Vec::new();
    if ruids.iter().any(|r| r.as_ref().is_empty()) {
        issues.push("Blank RUIDs are present.".to_string());
    }
    let duplicates = duplicate_ruids(ruids);
    if !duplicates.is_empty() {
        issues.push(format!("Duplicate RUIDs: {}", duplicates.join(", ")));
    }
    issues.join(" ")
}

#[must_use]
pub fn module_ruids(module: &CheckModule) -> Vec<String> {
    module.ruids()
}

#[must_use]
pub fn package_ruids(package: &CheckPackage) -> Vec<String> {
    package.ruids()
}
