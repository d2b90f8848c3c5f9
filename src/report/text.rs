use std::fmt::Write;

use crate::error::Result;

use super::{Report, ReportFormatter, display_message, status_label};

/// Plain-text summary followed by one line per result.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let header = &report.header;

        writeln!(output, "Rule check report").ok();
        if header.score_strategy.is_empty() {
            writeln!(output, "Score: {:.1}", header.score).ok();
        } else {
            writeln!(output, "Score: {:.1} ({})", header.score, header.score_strategy).ok();
        }
        writeln!(
            output,
            "Packages: {}, Modules: {}, Functions: {}",
            header.package_count, header.module_count, header.function_count
        )
        .ok();
        writeln!(output, "{}", report.overview()).ok();
        writeln!(output, "Duration: {:.3}s", report.duration_seconds).ok();
        if !header.env_nulls.is_empty() {
            writeln!(output, "Null environment keys: {}", header.env_nulls.join(", ")).ok();
        }

        if !report.results.is_empty() {
            writeln!(output).ok();
        }
        for record in &report.results {
            write!(
                output,
                "{:<5} {}.{}",
                status_label(record),
                record.module_name,
                record.func_name
            )
            .ok();
            if !record.ruid.is_empty() {
                write!(output, " [{}]", record.ruid).ok();
            }
            writeln!(output, " {}", display_message(record)).ok();
            if !record.warn_msg.is_empty() {
                writeln!(output, "      warning: {}", record.warn_msg).ok();
            }
        }

        Ok(output)
    }
}
