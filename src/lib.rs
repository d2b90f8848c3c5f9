pub mod checker;
pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod function;
pub mod loader;
pub mod render;
pub mod report;
pub mod result;
pub mod rule_control;
pub mod score;

pub use checker::{Checker, CheckerBuilder, Filter, RunStream};
pub use env::{Env, EnvFunction, EnvValue};
pub use error::{Result, RuleCheckError};
pub use function::{Attributes, CheckFunction, Outcome};
pub use loader::{CheckModule, CheckPackage};
pub use report::Report;
pub use result::CheckResult;
pub use rule_control::RuleControl;
pub use score::{ScoreStrategy, StrategyKind};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CHECK_FAILED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
