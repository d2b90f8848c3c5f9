use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, RuleCheckError};

/// Characters rejected in tags, rule ids and phases.
pub const DISALLOWED_CHARS: &str = " ,!@#$%^&*(){}[]<>~`-+=\t\n'\"";

/// Metadata attached to a check function.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Attributes {
    pub tag: String,
    pub ruid: String,
    pub level: u32,
    pub phase: String,
    pub weight: f64,
    pub skip: bool,
    pub skip_on_none: bool,
    pub fail_on_none: bool,
    pub finish_on_fail: bool,
    pub ttl_minutes: f64,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            tag: String::new(),
            ruid: String::new(),
            level: 1,
            phase: String::new(),
            weight: 100.0,
            skip: false,
            skip_on_none: false,
            fail_on_none: false,
            finish_on_fail: false,
            ttl_minutes: 0.0,
        }
    }
}

impl Attributes {
    /// Checks label characters and that the weight is a positive number.
    ///
    /// # Errors
    /// Returns `InvalidAttribute` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_label("tag", &self.tag)?;
        validate_label("ruid", &self.ruid)?;
        validate_label("phase", &self.phase)?;
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(RuleCheckError::InvalidAttribute {
                name: "weight",
                value: self.weight.to_string(),
                reason: "weight must be a number greater than 0".to_string(),
            });
        }
        if !self.ttl_minutes.is_finite() || self.ttl_minutes < 0.0 {
            return Err(RuleCheckError::InvalidAttribute {
                name: "ttl",
                value: self.ttl_minutes.to_string(),
                reason: "ttl must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Rejects labels containing any of [`DISALLOWED_CHARS`].
///
/// # Errors
/// Returns `InvalidAttribute` listing the offending characters.
pub fn validate_label(name: &'static str, value: &str) -> Result<()> {
    let bad: String = DISALLOWED_CHARS
        .chars()
        .filter(|c| value.contains(*c))
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(RuleCheckError::InvalidAttribute {
            name,
            value: value.to_string(),
            reason: format!("contains disallowed characters {bad:?}"),
        })
    }
}

static TTL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static pattern
    Regex::new(r"^\s*(-?(?:\d+\.?\d*|\.\d+))\s*([a-zA-Z]*)\s*$").expect("valid ttl regex")
});

/// Parses a time-to-live such as `"30 sec"`, `"1.5h"` or `"10"` into minutes.
///
/// A bare number is minutes.
///
/// # Errors
/// Returns `InvalidAttribute` for negative values, unknown units or malformed text.
pub fn parse_ttl(text: &str) -> Result<f64> {
    let invalid = |reason: &str| RuleCheckError::InvalidAttribute {
        name: "ttl",
        value: text.to_string(),
        reason: reason.to_string(),
    };

    let caps = TTL_PATTERN
        .captures(text)
        .ok_or_else(|| invalid("expected '<number> [unit]'"))?;
    let number: f64 = caps[1]
        .parse()
        .map_err(|_| invalid("not a number"))?;
    if number < 0.0 {
        return Err(invalid("ttl must not be negative"));
    }

    let scale = match caps[2].to_lowercase().as_str() {
        "" | "m" | "min" | "mins" | "minute" | "minutes" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1.0 / 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 60.0,
        _ => return Err(invalid("unknown unit")),
    };
    Ok(number * scale)
}

#[cfg(test)]
#[path = "attributes_tests.rs"]
mod tests;
