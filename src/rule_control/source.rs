use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, RuleCheckError};

use super::{RuleControl, RuleControlSpec};

const CATEGORIES: [&str; 4] = ["tags", "ruids", "phases", "levels"];

/// File formats accepted as rule-control sources, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcFormat {
    Toml,
    Json,
    Xml,
    Ini,
}

impl RcFormat {
    /// Picks the format from the file extension.
    ///
    /// # Errors
    /// Returns `RuleControlSource` for a missing or unsupported extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some("xml") => Ok(Self::Xml),
            Some("ini") => Ok(Self::Ini),
            _ => Err(source_error(
                path,
                "unsupported file type (expected .toml, .json, .xml or .ini)",
            )),
        }
    }
}

fn source_error(path: &Path, reason: impl Into<String>) -> RuleCheckError {
    RuleCheckError::RuleControlSource {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Reads and compiles the rule-control `section` of the file at `path`.
///
/// An empty section selects the document root (not allowed for INI).
///
/// # Errors
/// Returns `RuleControlSource` if the file cannot be read or parsed, or the
/// section is absent; `InvalidRegex` for a bad pattern.
pub fn load_rule_control(path: &Path, section: &str) -> Result<RuleControl> {
    RuleControl::from_spec(&load_rule_control_spec(path, section)?)
}

/// Reads the raw rule-control `section` of the file at `path`.
///
/// # Errors
/// See [`load_rule_control`].
pub fn load_rule_control_spec(path: &Path, section: &str) -> Result<RuleControlSpec> {
    let format = RcFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|e| source_error(path, e.to_string()))?;
    parse_rule_control_spec(&text, format, section, path)
}

/// Parses rule-control text in `format`. `path` is only used in error messages.
///
/// # Errors
/// See [`load_rule_control`].
pub fn parse_rule_control_spec(
    text: &str,
    format: RcFormat,
    section: &str,
    path: &Path,
) -> Result<RuleControlSpec> {
    let value = match format {
        RcFormat::Toml => {
            let doc: toml::Table =
                toml::from_str(text).map_err(|e| source_error(path, e.to_string()))?;
            let json = serde_json::to_value(doc).map_err(|e| source_error(path, e.to_string()))?;
            select_section(json, section, path)?
        }
        RcFormat::Json => {
            let json: Value =
                serde_json::from_str(text).map_err(|e| source_error(path, e.to_string()))?;
            select_section(json, section, path)?
        }
        RcFormat::Xml => parse_xml(text, section, path)?,
        RcFormat::Ini => parse_ini(text, section, path)?,
    };

    let spec: RuleControlSpec = serde_json::from_value(keep_categories(value))
        .map_err(|e| source_error(path, format!("section '{section}': {e}")))?;
    tracing::debug!(path = %path.display(), section, ?format, "rule-control loaded");
    Ok(spec)
}

/// Walks a dotted section path from the root object.
fn select_section(root: Value, section: &str, path: &Path) -> Result<Value> {
    if section.is_empty() {
        return Ok(root);
    }
    let mut current = root;
    for part in section.split('.') {
        current = match current {
            Value::Object(mut map) => map
                .remove(part)
                .ok_or_else(|| source_error(path, format!("section '{section}' not found")))?,
            _ => return Err(source_error(path, format!("section '{section}' not found"))),
        };
    }
    if current.is_object() {
        Ok(current)
    } else {
        Err(source_error(path, format!("section '{section}' is not a table")))
    }
}

/// Drops keys that are not rule-control categories.
fn keep_categories(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| CATEGORIES.contains(&k.as_str()))
                .collect(),
        ),
        other => other,
    }
}

/// `<section><tags><tag>t1</tag><tag>t2</tag></tags></section>` or
/// `<section><tags>t1 t2</tags></section>`.
///
/// Every element named `section` is read, in document order; a category seen
/// again replaces the earlier one.
fn parse_xml(text: &str, section: &str, path: &Path) -> Result<Value> {
    let doc = roxmltree::Document::parse(text).map_err(|e| source_error(path, e.to_string()))?;
    let sections: Vec<roxmltree::Node<'_, '_>> = if section.is_empty() {
        vec![doc.root_element()]
    } else {
        doc.descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == section)
            .collect()
    };
    if sections.is_empty() {
        return Err(source_error(path, format!("section '{section}' not found")));
    }

    let mut map = Map::new();
    for child in sections
        .iter()
        .flat_map(|node| node.children().filter(roxmltree::Node::is_element))
    {
        let values: Vec<Value> = child
            .descendants()
            .filter(roxmltree::Node::is_text)
            .filter_map(|n| n.text())
            .flat_map(str::split_whitespace)
            .map(|s| Value::String(s.to_string()))
            .collect();
        map.insert(child.tag_name().name().to_string(), Value::Array(values));
    }
    Ok(Value::Object(map))
}

/// Minimal INI reader: `[section]` headers, `key = value` or `key: value`
/// lines, `;` and `#` comments. Values are whitespace-separated patterns.
fn parse_ini(text: &str, section: &str, path: &Path) -> Result<Value> {
    if section.is_empty() {
        return Err(source_error(
            path,
            "a section must be provided to read INI rule-control files",
        ));
    }

    let mut current: Option<&str> = None;
    let mut found = false;
    let mut map = Map::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim();
            found |= name == section;
            current = Some(name);
            continue;
        }
        let Some((key, value)) = line.split_once(['=', ':']) else {
            return Err(source_error(
                path,
                format!("line {}: expected 'key = value'", lineno + 1),
            ));
        };
        if current.is_none() {
            return Err(source_error(
                path,
                format!("line {}: key outside of a section", lineno + 1),
            ));
        }
        if current == Some(section) {
            map.insert(
                key.trim().to_lowercase(),
                Value::String(value.trim().to_string()),
            );
        }
    }

    if found {
        Ok(Value::Object(map))
    } else {
        Err(source_error(path, format!("section '{section}' not found")))
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
