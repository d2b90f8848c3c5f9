use std::fmt::Write;

use crate::error::Result;
use crate::result::ResultRecord;

use super::{Report, ReportFormatter, display_message, status_label};

/// Summary table plus a details table of every non-passing result.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn icon(label: &str) -> &'static str {
        match label {
            "PASS" => "✅",
            "WARN" => "⚠️",
            "SKIP" => "⏭️",
            _ => "❌",
        }
    }

    fn escape(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn write_details(output: &mut String, records: &[&ResultRecord]) {
        writeln!(output, "### Details\n").ok();
        writeln!(output, "| Status | Function | RUID | Message |").ok();
        writeln!(output, "|:------:|----------|------|---------|").ok();
        for record in records {
            let label = status_label(record);
            writeln!(
                output,
                "| {} {label} | {}.{} | {} | {} |",
                Self::icon(label),
                record.module_name,
                record.func_name,
                record.ruid,
                Self::escape(display_message(record))
            )
            .ok();
        }
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let overview = report.overview();

        writeln!(output, "## Rule Check Results\n").ok();
        writeln!(output, "| Metric | Value |").ok();
        writeln!(output, "|--------|------:|").ok();
        writeln!(output, "| Score | {:.1} |", report.header.score).ok();
        writeln!(output, "| Functions | {} |", report.header.function_count).ok();
        writeln!(output, "| Total Results | {} |", overview.total).ok();
        writeln!(output, "| ✅ Passed | {} |", overview.passed).ok();
        writeln!(output, "| ❌ Failed | {} |", overview.failed).ok();
        writeln!(output, "| ❌ Errors | {} |", overview.errors).ok();
        writeln!(output, "| ⚠️ Warned | {} |", overview.warned).ok();
        writeln!(output, "| ⏭️ Skipped | {} |", overview.skipped).ok();
        writeln!(output).ok();

        let not_passed: Vec<_> = report
            .results
            .iter()
            .filter(|r| status_label(r) != "PASS")
            .collect();
        if !not_passed.is_empty() {
            Self::write_details(&mut output, &not_passed);
        }

        Ok(output)
    }
}
