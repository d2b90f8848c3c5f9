use crate::cli::{Cli, ShowArgs};
use crate::report::read_report;
use crate::{EXIT_CONFIG_ERROR, Result};

use super::{report_exit_code, write_output};

#[must_use]
pub fn run_show(args: &ShowArgs, cli: &Cli) -> i32 {
    match run_show_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Renders a saved report to stdout or `--output`.
///
/// # Errors
/// Returns an error if the report cannot be read, formatted or written.
pub fn run_show_impl(args: &ShowArgs, cli: &Cli) -> Result<i32> {
    let report = read_report(&args.report)?;
    let output = args.format.formatter().format(&report)?;
    write_output(args.output.as_deref(), &output, cli.quiet)?;
    Ok(report_exit_code(&report))
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
