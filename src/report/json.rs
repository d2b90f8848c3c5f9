use crate::error::Result;

use super::{Report, ReportFormatter};

/// Pretty-printed JSON; readable back with [`read_report`](super::read_report).
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
