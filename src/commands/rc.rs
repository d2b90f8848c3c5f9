use std::fmt::Write;

use crate::cli::{Cli, RcArgs, RcFormat};
use crate::rule_control::{RuleControlSummary, load_rule_control};
use crate::{EXIT_CONFIG_ERROR, EXIT_SUCCESS, Result};

use super::write_output;

#[must_use]
pub fn run_rc(args: &RcArgs, cli: &Cli) -> i32 {
    match run_rc_impl(args).and_then(|output| write_output(None, &output, cli.quiet)) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Loads a rule-control source and renders its normalized form.
///
/// # Errors
/// Returns `RuleControlSource` or `InvalidRegex` for unusable sources.
pub fn run_rc_impl(args: &RcArgs) -> Result<String> {
    let rule_control = load_rule_control(&args.file, &args.section)?;
    let summary = rule_control.summary();
    match args.format {
        RcFormat::Text => Ok(format_rule_control_text(&summary)),
        RcFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&summary)?)),
    }
}

/// One line per category: `+pattern` includes, `-pattern` excludes,
/// `(any)` when the category is unconstrained.
#[must_use]
pub fn format_rule_control_text(summary: &RuleControlSummary) -> String {
    let mut output = String::new();
    let categories = [
        ("tags", &summary.tags),
        ("ruids", &summary.ruids),
        ("phases", &summary.phases),
        ("levels", &summary.levels),
    ];
    for (name, category) in categories {
        let entries: Vec<String> = category
            .include
            .iter()
            .map(|p| format!("+{p}"))
            .chain(category.exclude.iter().map(|p| format!("-{p}")))
            .collect();
        let shown = if entries.is_empty() {
            "(any)".to_string()
        } else {
            entries.join(" ")
        };
        writeln!(output, "{name}: {shown}").ok();
    }
    output
}

#[cfg(test)]
#[path = "rc_tests.rs"]
mod tests;
