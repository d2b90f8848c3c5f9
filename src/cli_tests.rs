use std::path::PathBuf;

use super::*;

#[test]
fn cli_rc_defaults() {
    let cli = Cli::parse_from(["rulecheck", "rc", "rules.toml"]);
    match cli.command {
        Commands::Rc(args) => {
            assert_eq!(args.file, PathBuf::from("rules.toml"));
            assert_eq!(args.section, "");
            assert_eq!(args.format, RcFormat::Text);
        }
        _ => panic!("Expected Rc command"),
    }
}

#[test]
fn cli_rc_with_section_and_format() {
    let cli = Cli::parse_from(["rulecheck", "rc", "rules.ini", "-s", "prod", "--format", "json"]);
    match cli.command {
        Commands::Rc(args) => {
            assert_eq!(args.section, "prod");
            assert_eq!(args.format, RcFormat::Json);
        }
        _ => panic!("Expected Rc command"),
    }
}

#[test]
fn cli_score_with_strategy() {
    let cli = Cli::parse_from(["rulecheck", "score", "report.json", "--strategy", "by_function_mean"]);
    match cli.command {
        Commands::Score(args) => {
            assert_eq!(args.report, PathBuf::from("report.json"));
            assert_eq!(args.strategy.as_deref(), Some("by_function_mean"));
        }
        _ => panic!("Expected Score command"),
    }
}

#[test]
fn cli_show_with_format_and_output() {
    let cli = Cli::parse_from(["rulecheck", "show", "report.json", "-f", "md", "-o", "out.md"]);
    match cli.command {
        Commands::Show(args) => {
            assert_eq!(args.format, ReportFormat::Markdown);
            assert_eq!(args.output, Some(PathBuf::from("out.md")));
        }
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn cli_show_rejects_unknown_format() {
    let result = Cli::try_parse_from(["rulecheck", "show", "report.json", "--format", "sarif"]);
    assert!(result.is_err());
}

#[test]
fn cli_global_flags() {
    let cli = Cli::parse_from([
        "rulecheck",
        "-vv",
        "--quiet",
        "--no-config",
        "score",
        "report.json",
        "--config",
        "custom.toml",
    ]);
    assert_eq!(cli.verbose, 2);
    assert!(cli.quiet);
    assert!(cli.no_config);
    assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["rulecheck"]).is_err());
}
