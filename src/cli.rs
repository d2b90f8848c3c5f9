use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::report::ReportFormat;

/// Output format for the `rc` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RcFormat {
    /// One line per category
    #[default]
    Text,
    /// Normalized include/exclude lists as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "rulecheck")]
#[command(author, version, about = "Rule checker - inspect rule-control sources and saved run reports")]
#[command(long_about = "Inspect rule-control sources and re-score or render saved rule-check reports.\n\n\
    Exit codes:\n  \
    0 - Success\n  \
    1 - Report contains failures\n  \
    2 - Configuration or runtime error")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file (default: ./rulecheck.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip loading configuration file
    #[arg(long, global = true)]
    pub no_config: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a rule-control file and print its normalized form
    Rc(RcArgs),

    /// Re-score a saved JSON report
    Score(ScoreArgs),

    /// Render a saved JSON report
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct RcArgs {
    /// Rule-control file (.toml, .json, .xml or .ini)
    pub file: PathBuf,

    /// Section to read; empty selects the document root
    #[arg(short, long, default_value = "")]
    pub section: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: RcFormat,
}

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Report written by a previous run
    pub report: PathBuf,

    /// Scoring strategy (overrides config), e.g. by_result, by_function_mean
    #[arg(short, long)]
    pub strategy: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Report written by a previous run
    pub report: PathBuf,

    /// Output format [possible values: text, json, markdown]
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
