//! Check-function wrapper.
//!
//! A [`CheckFunction`] owns a user-supplied check body together with its
//! metadata. Calling it binds parameters from the environment and returns a
//! lazy [`CheckRun`] of stamped [`CheckResult`]s.

mod args;
pub mod attributes;
pub mod doc;
mod outcome;
mod run;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::env::Env;
use crate::error::{Result, RuleCheckError};
use crate::result::CheckResult;

pub use args::Args;
pub use attributes::{Attributes, parse_ttl, validate_label};
pub use outcome::{Outcome, ResultStream, Yielded};
pub use run::CheckRun;

/// Signature of a check body.
pub type CheckBody = dyn Fn(&Args) -> anyhow::Result<Outcome> + Send + Sync;

/// A check body plus the metadata used to filter, run and report it.
#[derive(Clone)]
pub struct CheckFunction {
    body: Arc<CheckBody>,
    name: String,
    module: String,
    package: String,
    params: Vec<String>,
    attributes: Attributes,
    doc: String,
    index: usize,
}

impl std::fmt::Debug for CheckFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckFunction")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("package", &self.package)
            .field("params", &self.params)
            .field("attributes", &self.attributes)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for CheckFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckFunction({})", self.name)
    }
}

impl CheckFunction {
    /// Starts building a check function named `name`.
    ///
    /// The body may return anything convertible into an [`Outcome`]: a `bool`,
    /// a [`CheckResult`], a `Vec<CheckResult>` or an [`Outcome`] itself.
    pub fn builder<F, O>(name: impl Into<String>, body: F) -> CheckFunctionBuilder
    where
        F: Fn(&Args) -> anyhow::Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        CheckFunctionBuilder {
            name: name.into(),
            body: Arc::new(move |args: &Args| -> anyhow::Result<Outcome> {
                body(args).map(Into::into)
            }),
            params: Vec::new(),
            attributes: Attributes::default(),
            ttl: None,
            doc: String::new(),
        }
    }

    /// A check function with default attributes and no parameters.
    ///
    /// # Errors
    /// Returns an error if `name` is empty.
    pub fn new<F, O>(name: impl Into<String>, body: F) -> Result<Self>
    where
        F: Fn(&Args) -> anyhow::Result<O> + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        Self::builder(name, body).build()
    }

    // Accessor methods

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.attributes.tag
    }

    #[must_use]
    pub fn ruid(&self) -> &str {
        &self.attributes.ruid
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.attributes.level
    }

    #[must_use]
    pub fn phase(&self) -> &str {
        &self.attributes.phase
    }

    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.attributes.weight
    }

    #[must_use]
    pub const fn skip(&self) -> bool {
        self.attributes.skip
    }

    #[must_use]
    pub const fn finish_on_fail(&self) -> bool {
        self.attributes.finish_on_fail
    }

    #[must_use]
    pub const fn ttl_minutes(&self) -> f64 {
        self.attributes.ttl_minutes
    }

    /// Load order assigned by the owning module or checker, starting at 1.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Named documentation section, or the summary line when `name` is `None`.
    #[must_use]
    pub fn doc_section(&self, name: Option<&str>) -> String {
        doc::doc_section(&self.doc, name)
    }

    #[must_use]
    pub fn summary(&self) -> String {
        doc::summary(&self.doc)
    }

    #[must_use]
    pub fn mitigation(&self) -> String {
        self.doc_section(Some("Mitigation"))
    }

    #[must_use]
    pub fn owners(&self) -> Vec<String> {
        doc::owners(&self.doc)
    }

    pub(crate) const fn body(&self) -> &Arc<CheckBody> {
        &self.body
    }

    pub(crate) fn set_module(&mut self, module: &str) {
        module.clone_into(&mut self.module);
    }

    pub(crate) fn set_package(&mut self, package: &str) {
        package.clone_into(&mut self.package);
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub(crate) fn set_ruid(&mut self, ruid: String) {
        self.attributes.ruid = ruid;
    }

    /// Binds declared parameters from `env` and prepares a lazy run.
    ///
    /// Skipped functions and `None`-valued parameters under `skip_on_none` /
    /// `fail_on_none` produce a single result without invoking the body.
    ///
    /// # Errors
    /// Returns `MissingParameter` if a declared parameter is not in `env`.
    pub fn call(&self, env: &Env) -> Result<CheckRun> {
        if self.attributes.skip {
            let msg = format!("Skipped {}", self.name);
            return Ok(CheckRun::single(self.clone(), CheckResult::skip(msg)));
        }

        let mut values = IndexMap::with_capacity(self.params.len());
        for param in &self.params {
            let value = env
                .get_shared(param)
                .ok_or_else(|| RuleCheckError::MissingParameter {
                    function: self.name.clone(),
                    parameter: param.clone(),
                })?;
            values.insert(param.clone(), value);
        }

        let first_null = values.values().position(|v| v.is_null()).map(|i| i + 1);
        if let Some(n) = first_null {
            if self.attributes.fail_on_none {
                let msg = format!("Failed due to None arg. {n} in func='{}'", self.name);
                return Ok(CheckRun::single(self.clone(), CheckResult::fail(msg)));
            }
            if self.attributes.skip_on_none {
                let msg = format!("Skipped due to None arg. {n} in func='{}'", self.name);
                return Ok(CheckRun::single(self.clone(), CheckResult::skip(msg)));
            }
        }

        Ok(CheckRun::new(self.clone(), Args::new(values)))
    }
}

/// Builder for [`CheckFunction`]; created by [`CheckFunction::builder`].
pub struct CheckFunctionBuilder {
    name: String,
    body: Arc<CheckBody>,
    params: Vec<String>,
    attributes: Attributes,
    ttl: Option<String>,
    doc: String,
}

impl CheckFunctionBuilder {
    /// Declares a parameter looked up in the environment by name.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    #[must_use]
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.attributes.tag = tag.into();
        self
    }

    #[must_use]
    pub fn ruid(mut self, ruid: impl Into<String>) -> Self {
        self.attributes.ruid = ruid.into();
        self
    }

    #[must_use]
    pub const fn level(mut self, level: u32) -> Self {
        self.attributes.level = level;
        self
    }

    #[must_use]
    pub fn phase(mut self, phase: impl Into<String>) -> Self {
        self.attributes.phase = phase.into();
        self
    }

    #[must_use]
    pub const fn weight(mut self, weight: f64) -> Self {
        self.attributes.weight = weight;
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: bool) -> Self {
        self.attributes.skip = skip;
        self
    }

    #[must_use]
    pub const fn skip_on_none(mut self, skip_on_none: bool) -> Self {
        self.attributes.skip_on_none = skip_on_none;
        self
    }

    #[must_use]
    pub const fn fail_on_none(mut self, fail_on_none: bool) -> Self {
        self.attributes.fail_on_none = fail_on_none;
        self
    }

    #[must_use]
    pub const fn finish_on_fail(mut self, finish_on_fail: bool) -> Self {
        self.attributes.finish_on_fail = finish_on_fail;
        self
    }

    /// Time-to-live text such as `"30 sec"` or `"2h"`; parsed by `build`.
    #[must_use]
    pub fn ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = Some(ttl.into());
        self
    }

    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Validates metadata and produces the check function.
    ///
    /// # Errors
    /// Returns an error for an empty name, invalid or duplicate parameter
    /// names, invalid attributes or an unparsable ttl.
    pub fn build(mut self) -> Result<CheckFunction> {
        if self.name.trim().is_empty() {
            return Err(RuleCheckError::InvalidAttribute {
                name: "name",
                value: self.name,
                reason: "check functions must be named".to_string(),
            });
        }
        for (i, param) in self.params.iter().enumerate() {
            if param.is_empty() || param.chars().any(|c| !(c.is_alphanumeric() || c == '_')) {
                return Err(RuleCheckError::InvalidParameter(format!(
                    "'{param}' in func='{}' is not a valid parameter name",
                    self.name
                )));
            }
            if self.params[..i].contains(param) {
                return Err(RuleCheckError::InvalidParameter(format!(
                    "'{param}' is declared twice in func='{}'",
                    self.name
                )));
            }
        }
        if let Some(ttl) = &self.ttl {
            self.attributes.ttl_minutes = parse_ttl(ttl)?;
        }
        self.attributes.validate()?;

        Ok(CheckFunction {
            body: self.body,
            name: self.name,
            module: String::new(),
            package: String::new(),
            params: self.params,
            attributes: self.attributes,
            doc: self.doc,
            index: 0,
        })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
