//! Parsing of check-function documentation.
//!
//! Documentation is free text whose first line is a summary, optionally
//! followed by named sections:
//!
//! ```text
//! Disk usage stays below the quota.
//!
//! Mitigation:
//!     Rotate logs.
//!
//! Owner:
//!     ops@example.com
//! ```
//!
//! A section runs from its `Name:` header line to the next header line.

use std::sync::LazyLock;

use regex::Regex;

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static pattern
    Regex::new(r"^([A-Za-z][A-Za-z ]*):\s*$").expect("valid section regex")
});

/// Removes the indentation common to every line after the first and trims
/// leading and trailing blank lines.
#[must_use]
pub fn clean_doc(doc: &str) -> String {
    let lines: Vec<&str> = doc.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim().to_string()
            } else {
                line.get(indent..)
                    .map_or_else(|| line.trim(), str::trim_end)
                    .to_string()
            }
        })
        .collect();

    cleaned.join("\n").trim_matches('\n').to_string()
}

/// Returns the named section's text, trimmed, or `""` if absent.
///
/// With no name, returns the summary line.
#[must_use]
pub fn doc_section(doc: &str, name: Option<&str>) -> String {
    let doc = clean_doc(doc);
    let Some(name) = name else {
        return doc.lines().next().unwrap_or_default().trim().to_string();
    };

    let mut body: Vec<&str> = Vec::new();
    let mut inside = false;
    for line in doc.lines() {
        if let Some(caps) = SECTION_HEADER.captures(line.trim()) {
            if inside {
                break;
            }
            inside = caps[1].eq_ignore_ascii_case(name);
            continue;
        }
        if inside {
            body.push(line.trim());
        }
    }
    body.join("\n").trim().to_string()
}

/// First paragraph of the documentation, joined onto one line.
#[must_use]
pub fn summary(doc: &str) -> String {
    clean_doc(doc)
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Owners listed in the `Owner:` section, split on whitespace and commas.
#[must_use]
pub fn owners(doc: &str) -> Vec<String> {
    doc_section(doc, Some("Owner"))
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[path = "doc_tests.rs"]
mod tests;
