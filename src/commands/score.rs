use crate::cli::{Cli, ScoreArgs};
use crate::report::{Report, read_report};
use crate::score::StrategyKind;
use crate::{EXIT_CONFIG_ERROR, Result};

use super::{load_config, report_exit_code, write_output};

#[must_use]
pub fn run_score(args: &ScoreArgs, cli: &Cli) -> i32 {
    match run_score_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {e}");
            EXIT_CONFIG_ERROR
        }
    }
}

/// Re-scores a saved report. The strategy comes from `--strategy`, else the
/// config file, else `by_result`.
///
/// # Errors
/// Returns an error if the report cannot be read or the strategy is unknown.
pub fn run_score_impl(args: &ScoreArgs, cli: &Cli) -> Result<i32> {
    let report = read_report(&args.report)?;
    let kind = match &args.strategy {
        Some(name) => name.parse::<StrategyKind>()?,
        None => load_config(cli.config.as_deref(), cli.no_config)?.score_strategy,
    };
    tracing::debug!(strategy = kind.as_str(), "re-scoring report");
    write_output(None, &score_report(&report, kind), cli.quiet)?;
    Ok(report_exit_code(&report))
}

/// `Score: <x.y>` followed by the overview line.
#[must_use]
pub fn score_report(report: &Report, kind: StrategyKind) -> String {
    let score = report.rescore(kind.strategy().as_ref());
    format!("Score: {score:.1}\n{}\n", report.overview())
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
