use crate::env::EnvFunction;
use crate::error::{Result, RuleCheckError};

use super::module::CheckModule;
use super::ruid::duplicate_ruids;

/// A named collection of modules, ordered by module name.
#[derive(Debug, Clone)]
pub struct CheckPackage {
    name: String,
    modules: Vec<CheckModule>,
}

impl CheckPackage {
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CheckPackageBuilder {
        CheckPackageBuilder {
            name: name.into(),
            modules: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn modules(&self) -> &[CheckModule] {
        &self.modules
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    /// Rule ids across all modules in load order, blanks included.
    #[must_use]
    pub fn ruids(&self) -> Vec<String> {
        self.modules.iter().flat_map(CheckModule::ruids).collect()
    }

    pub fn env_functions(&self) -> impl Iterator<Item = &EnvFunction> {
        self.modules.iter().flat_map(CheckModule::env_functions)
    }
}

/// Builder for [`CheckPackage`].
pub struct CheckPackageBuilder {
    name: String,
    modules: Vec<CheckModule>,
}

impl CheckPackageBuilder {
    #[must_use]
    pub fn module(mut self, module: CheckModule) -> Self {
        self.modules.push(module);
        self
    }

    #[must_use]
    pub fn modules(mut self, modules: impl IntoIterator<Item = CheckModule>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Sorts modules by name and checks rule ids are unique across them.
    ///
    /// # Errors
    /// Returns `DuplicateRuids` naming every id declared in more than one place.
    pub fn build(mut self) -> Result<CheckPackage> {
        self.modules.sort_by(|a, b| a.name().cmp(b.name()));
        for module in &mut self.modules {
            module.set_package(&self.name);
        }

        let ruids: Vec<String> = self.modules.iter().flat_map(CheckModule::ruids).collect();
        let duplicates = duplicate_ruids(&ruids);
        if !duplicates.is_empty() {
            return Err(RuleCheckError::DuplicateRuids {
                scope: "package".to_string(),
                ruids: duplicates,
            });
        }

        tracing::debug!(package = %self.name, modules = self.modules.len(), "package loaded");
        Ok(CheckPackage {
            name: self.name,
            modules: self.modules,
        })
    }
}
