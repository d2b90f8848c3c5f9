#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use rulecheck::report::write_report;
use rulecheck::{CheckFunction, CheckResult, Checker};

/// Creates an `assert_cmd` Command for the rulecheck binary.
#[macro_export]
macro_rules! rulecheck {
    () => {
        assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("rulecheck"))
    };
}

/// Temporary directory holding rule-control files, configs and reports.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content and returns its path.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn create_config(&self, content: &str) -> PathBuf {
        self.create_file("rulecheck.toml", content)
    }

    /// Runs one ad hoc check per status and saves the report as JSON.
    pub fn create_report(&self, relative_path: &str, statuses: &[bool]) -> PathBuf {
        let functions = statuses.iter().enumerate().map(|(i, &status)| {
            CheckFunction::new(format!("check_{i}"), move |_| {
                Ok(CheckResult::new(status, format!("check {i} ran")))
            })
            .expect("valid check function")
        });
        let mut checker = Checker::builder()
            .functions(functions)
            .auto_setup(true)
            .build()
            .expect("checker builds");
        checker.run_all().expect("run succeeds");

        let path = self.dir.path().join(relative_path);
        write_report(&checker.report(), &path).expect("Failed to write report");
        path
    }
}
