//! Grouping of check functions into modules and packages.
//!
//! Check functions are registered explicitly through builders rather than
//! discovered from files. Rule-id uniqueness is enforced when a module or
//! package is built.

mod module;
mod package;
pub mod ruid;

pub use module::{CheckModule, CheckModuleBuilder};
pub use package::{CheckPackage, CheckPackageBuilder};
pub use ruid::{
    duplicate_ruids, empty_ruids, module_ruids, package_ruids, ruid_issues, valid_ruids,
};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
