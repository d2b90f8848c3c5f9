use crate::env::EnvFunction;
use crate::error::{Result, RuleCheckError};
use crate::function::CheckFunction;

use super::ruid::duplicate_ruids;

/// An ordered group of check functions plus the environment functions they rely on.
#[derive(Debug, Clone)]
pub struct CheckModule {
    name: String,
    functions: Vec<CheckFunction>,
    env_functions: Vec<EnvFunction>,
}

impl CheckModule {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CheckModuleBuilder {
        CheckModuleBuilder {
            name: name.into(),
            functions: Vec::new(),
            env_functions: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check functions in declaration order.
    #[must_use]
    pub fn check_functions(&self) -> &[CheckFunction] {
        &self.functions
    }

    #[must_use]
    pub fn env_functions(&self) -> &[EnvFunction] {
        &self.env_functions
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Rule ids in declaration order, blanks included.
    #[must_use]
    pub fn ruids(&self) -> Vec<String> {
        self.functions.iter().map(|f| f.ruid().to_string()).collect()
    }

    pub(crate) fn set_package(&mut self, package: &str) {
        for function in &mut self.functions {
            function.set_package(package);
        }
    }
}

/// Builder for [`CheckModule`].
pub struct CheckModuleBuilder {
    name: String,
    functions: Vec<CheckFunction>,
    env_functions: Vec<EnvFunction>,
}

impl CheckModuleBuilder {
    #[must_use]
    pub fn function(mut self, function: CheckFunction) -> Self {
        self.functions.push(function);
        self
    }

    #[must_use]
    pub fn functions(mut self, functions: impl IntoIterator<Item = CheckFunction>) -> Self {
        self.functions.extend(functions);
        self
    }

    #[must_use]
    pub fn env_function(mut self, function: EnvFunction) -> Self {
        self.env_functions.push(function);
        self
    }

    /// Assigns module name and load order, then checks rule-id uniqueness.
    ///
    /// # Errors
    /// Returns `DuplicateRuids` naming every id declared more than once.
    pub fn build(mut self) -> Result<CheckModule> {
        for (index, function) in self.functions.iter_mut().enumerate() {
            function.set_module(&self.name);
            function.set_index(index + 1);
        }

        let ruids: Vec<&str> = self.functions.iter().map(CheckFunction::ruid).collect();
        let duplicates = duplicate_ruids(&ruids);
        if !duplicates.is_empty() {
            return Err(RuleCheckError::DuplicateRuids {
                scope: "module".to_string(),
                ruids: duplicates,
            });
        }

        tracing::debug!(
            module = %self.name,
            functions = self.functions.len(),
            env_functions = self.env_functions.len(),
            "module loaded"
        );
        Ok(CheckModule {
            name: self.name,
            functions: self.functions,
            env_functions: self.env_functions,
        })
    }
}
