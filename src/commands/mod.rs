pub mod rc;
pub mod score;
pub mod show;

use std::path::Path;

use crate::config::{CheckerConfig, ConfigLoader, FileConfigLoader};
use crate::report::Report;
use crate::{EXIT_CHECK_FAILED, EXIT_SUCCESS, Result};

pub use rc::{format_rule_control_text, run_rc, run_rc_impl};
pub use score::{run_score, run_score_impl, score_report};
pub use show::{run_show, run_show_impl};

/// Loads the checker config unless `no_config` is set.
///
/// # Errors
/// Returns an error if an explicit or discovered config file is invalid.
pub fn load_config(config_path: Option<&Path>, no_config: bool) -> Result<CheckerConfig> {
    if no_config {
        return Ok(CheckerConfig::default());
    }

    let loader = FileConfigLoader::new();
    config_path.map_or_else(|| loader.load(), |path| loader.load_from_path(path))
}

pub(crate) fn write_output(output_path: Option<&Path>, content: &str, quiet: bool) -> Result<()> {
    if let Some(path) = output_path {
        std::fs::write(path, content)?;
    } else if !quiet {
        print!("{content}");
    }
    Ok(())
}

pub(crate) fn report_exit_code(report: &Report) -> i32 {
    if report.has_failures() {
        EXIT_CHECK_FAILED
    } else {
        EXIT_SUCCESS
    }
}
