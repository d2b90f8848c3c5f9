use crate::error::{Result, RuleCheckError};
use crate::function::CheckFunction;
use crate::function::attributes::DISALLOWED_CHARS;

/// Predicate over collected check functions. Filters passed to
/// [`Checker::prepare`](super::Checker::prepare) are ANDed.
pub type Filter = Box<dyn Fn(&CheckFunction) -> bool + Send + Sync>;

/// Normalizes a list of labels. Each entry is split on whitespace, so
/// `["a b", "c"]` yields `["a", "b", "c"]`.
///
/// # Errors
/// Returns `InvalidParameter` if a label contains a disallowed character.
pub fn param_str_list<I, S>(params: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for param in params {
        for item in param.as_ref().split_whitespace() {
            if let Some(bad) = item.chars().find(|c| DISALLOWED_CHARS.contains(*c)) {
                return Err(RuleCheckError::InvalidParameter(format!(
                    "Invalid character '{bad}' in '{item}'"
                )));
            }
            out.push(item.to_string());
        }
    }
    Ok(out)
}

/// Normalizes a list of levels. Accepts numbers or whitespace-separated
/// digit strings.
///
/// # Errors
/// Returns `InvalidParameter` if an entry is not made of digits only.
pub fn param_int_list<I, S>(params: I) -> Result<Vec<u32>>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let mut out = Vec::new();
    for param in params {
        for item in param.to_string().split_whitespace() {
            if !item.chars().all(|c| c.is_ascii_digit()) {
                return Err(RuleCheckError::InvalidParameter(format!(
                    "Level '{item}' is not an integer"
                )));
            }
            let level = item.parse().map_err(|_| {
                RuleCheckError::InvalidParameter(format!("Level '{item}' is out of range"))
            })?;
            out.push(level);
        }
    }
    Ok(out)
}

fn keep_labels(labels: Vec<String>, get: fn(&CheckFunction) -> &str, keep: bool) -> Filter {
    Box::new(move |f| labels.iter().any(|l| l == get(f)) == keep)
}

fn keep_level_list(levels: Vec<u32>, keep: bool) -> Filter {
    Box::new(move |f| levels.contains(&f.level()) == keep)
}

/// Keeps functions whose rule id is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn keep_ruids<I: IntoIterator<Item = S>, S: AsRef<str>>(ruids: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(ruids)?, CheckFunction::ruid, true))
}

/// Keeps functions whose tag is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn keep_tags<I: IntoIterator<Item = S>, S: AsRef<str>>(tags: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(tags)?, CheckFunction::tag, true))
}

/// Keeps functions whose phase is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn keep_phases<I: IntoIterator<Item = S>, S: AsRef<str>>(phases: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(phases)?, CheckFunction::phase, true))
}

/// Keeps functions whose level is listed.
///
/// # Errors
/// Returns `InvalidParameter` for non-numeric levels.
pub fn keep_levels<I: IntoIterator<Item = S>, S: ToString>(levels: I) -> Result<Filter> {
    Ok(keep_level_list(param_int_list(levels)?, true))
}

/// Drops functions whose rule id is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn exclude_ruids<I: IntoIterator<Item = S>, S: AsRef<str>>(ruids: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(ruids)?, CheckFunction::ruid, false))
}

/// Drops functions whose tag is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn exclude_tags<I: IntoIterator<Item = S>, S: AsRef<str>>(tags: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(tags)?, CheckFunction::tag, false))
}

/// Drops functions whose phase is listed.
///
/// # Errors
/// Returns `InvalidParameter` for malformed labels.
pub fn exclude_phases<I: IntoIterator<Item = S>, S: AsRef<str>>(phases: I) -> Result<Filter> {
    Ok(keep_labels(param_str_list(phases)?, CheckFunction::phase, false))
}

/// Drops functions whose level is listed.
///
/// # Errors
/// Returns `InvalidParameter` for non-numeric levels.
pub fn exclude_levels<I: IntoIterator<Item = S>, S: ToString>(levels: I) -> Result<Filter> {
    Ok(keep_level_list(param_int_list(levels)?, false))
}

/// Attribute lists for [`Checker::include_by_attribute`](super::Checker::include_by_attribute)
/// and [`Checker::exclude_by_attribute`](super::Checker::exclude_by_attribute).
///
/// Each builder method normalizes and validates its entries, so a selection
/// that exists is well formed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSelection {
    tags: Vec<String>,
    ruids: Vec<String>,
    levels: Vec<u32>,
    phases: Vec<String>,
}

impl AttributeSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns `InvalidParameter` for malformed labels.
    pub fn tags<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, tags: I) -> Result<Self> {
        self.tags.extend(param_str_list(tags)?);
        Ok(self)
    }

    /// # Errors
    /// Returns `InvalidParameter` for malformed labels.
    pub fn ruids<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, ruids: I) -> Result<Self> {
        self.ruids.extend(param_str_list(ruids)?);
        Ok(self)
    }

    /// # Errors
    /// Returns `InvalidParameter` for non-numeric levels.
    pub fn levels<I: IntoIterator<Item = S>, S: ToString>(mut self, levels: I) -> Result<Self> {
        self.levels.extend(param_int_list(levels)?);
        Ok(self)
    }

    /// # Errors
    /// Returns `InvalidParameter` for malformed labels.
    pub fn phases<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, phases: I) -> Result<Self> {
        self.phases.extend(param_str_list(phases)?);
        Ok(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.ruids.is_empty() && self.levels.is_empty() && self.phases.is_empty()
    }

    /// True if any category lists the function's value.
    #[must_use]
    pub fn any_match(&self, function: &CheckFunction) -> bool {
        self.tags.iter().any(|t| t == function.tag())
            || self.ruids.iter().any(|r| r == function.ruid())
            || self.levels.contains(&function.level())
            || self.phases.iter().any(|p| p == function.phase())
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
