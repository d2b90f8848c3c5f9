//! The rule checker: collects check functions, narrows them down, runs them
//! against a shared environment and scores the results.

pub mod filter;
pub mod progress;
mod stream;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::CheckerConfig;
use crate::env::{Env, load_environment};
use crate::error::{Result, RuleCheckError};
use crate::function::CheckFunction;
use crate::loader::{CheckModule, CheckPackage, empty_ruids, ruid_issues, valid_ruids};
use crate::render::{MarkupRenderer, Renderer};
use crate::report::{Report, ReportHeader};
use crate::result::CheckResult;
use crate::rule_control::{RuleControl, load_rule_control};
use crate::score::{ScoreByResult, ScoreStrategy};

pub use filter::{
    AttributeSelection, Filter, exclude_levels, exclude_phases, exclude_ruids, exclude_tags,
    keep_levels, keep_phases, keep_ruids, keep_tags, param_int_list, param_str_list,
};
pub use progress::{BarProgress, DebugProgress, NoProgress, Progress};
pub use stream::RunStream;

/// Module name given to functions passed to the checker directly.
pub const ADHOC_MODULE: &str = "adhoc";

const AUTO_RUID_PREFIX: &str = "__ruid__";

/// Orchestrates one rule-check run.
///
/// Lifecycle: [`pre_collect`](Self::pre_collect), [`prepare`](Self::prepare),
/// then [`stream`](Self::stream) or [`run_all`](Self::run_all). Queries read
/// the collected functions and the accumulated results.
pub struct Checker {
    packages: Vec<CheckPackage>,
    modules: Vec<CheckModule>,
    check_functions: Vec<CheckFunction>,
    pre_collected: Vec<CheckFunction>,
    collected: Vec<CheckFunction>,
    results: Vec<CheckResult>,
    env: Env,
    env_nulls: Vec<String>,
    rule_control: Option<RuleControl>,
    score_strategy: Box<dyn ScoreStrategy>,
    renderer: Arc<dyn Renderer>,
    progress: Box<dyn Progress + Send>,
    abort_on_fail: bool,
    abort_on_exception: bool,
    auto_ruid: bool,
    score: f64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl std::fmt::Debug for Checker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checker")
            .field("packages", &self.package_count())
            .field("modules", &self.modules.len())
            .field("functions", &self.check_functions.len())
            .field("collected", &self.collected.len())
            .field("results", &self.results.len())
            .field("score_strategy", &self.score_strategy.name())
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}

impl Checker {
    #[must_use]
    pub fn builder() -> CheckerBuilder {
        CheckerBuilder::default()
    }

    /// Flattens packages, then modules, then ad hoc functions, in that order.
    pub fn pre_collect(&mut self) -> &[CheckFunction] {
        self.pre_collected = self
            .packages
            .iter()
            .flat_map(CheckPackage::modules)
            .chain(&self.modules)
            .flat_map(|m| m.check_functions().iter().cloned())
            .chain(self.check_functions.iter().cloned())
            .collect();
        &self.pre_collected
    }

    /// Selects the functions for the next run.
    ///
    /// Generates missing rule ids when `auto_ruid` is set, keeps functions
    /// accepted by every filter, then applies rule control. Rule ids must
    /// afterwards be either all empty or all unique and non-empty.
    ///
    /// # Errors
    /// Returns `RuidIssues` if rule ids are partially missing or duplicated.
    pub fn prepare(&mut self, filters: &[Filter]) -> Result<&[CheckFunction]> {
        if self.pre_collected.is_empty() {
            self.pre_collect();
        }
        if self.auto_ruid {
            self.generate_ruids();
        }

        self.collected = self
            .pre_collected
            .iter()
            .filter(|&f| filters.iter().all(|keep| keep(f)))
            .cloned()
            .collect();
        self.apply_rule_control(None);

        let ruids = self.ruids_in_order();
        if !(empty_ruids(&ruids) || valid_ruids(&ruids)) {
            return Err(RuleCheckError::RuidIssues(ruid_issues(&ruids)));
        }
        tracing::debug!(
            pre_collected = self.pre_collected.len(),
            collected = self.collected.len(),
            "prepared check functions"
        );
        Ok(&self.collected)
    }

    fn generate_ruids(&mut self) {
        let mut next_id = 0;
        for function in &mut self.pre_collected {
            if function.ruid().is_empty() {
                next_id += 1;
                function.set_ruid(format!("{AUTO_RUID_PREFIX}{next_id:04}"));
            }
        }
    }

    fn ruids_in_order(&self) -> Vec<String> {
        self.collected.iter().map(|f| f.ruid().to_string()).collect()
    }

    /// Replaces the rule control if one is given, then keeps only the
    /// collected functions it accepts.
    pub fn apply_rule_control(&mut self, rule_control: Option<RuleControl>) -> &[CheckFunction] {
        if rule_control.is_some() {
            self.rule_control = rule_control;
        }
        if let Some(rc) = &self.rule_control {
            self.collected.retain(|f| rc.matches(f));
        }
        &self.collected
    }

    /// Keeps collected functions matching any listed attribute value.
    /// An empty selection keeps everything.
    pub fn include_by_attribute(&mut self, selection: &AttributeSelection) -> &[CheckFunction] {
        if !selection.is_empty() {
            self.collected.retain(|f| selection.any_match(f));
        }
        &self.collected
    }

    /// Drops collected functions matching any listed attribute value.
    pub fn exclude_by_attribute(&mut self, selection: &AttributeSelection) -> &[CheckFunction] {
        self.collected.retain(|f| !selection.any_match(f));
        &self.collected
    }

    /// Layers every environment function of the loaded packages and modules
    /// over the base environment and records keys bound to null.
    ///
    /// # Errors
    /// Returns `EnvFunction` if an environment function fails.
    pub fn load_environments(&mut self) -> Result<Env> {
        let functions = self
            .packages
            .iter()
            .flat_map(CheckPackage::modules)
            .chain(&self.modules)
            .flat_map(CheckModule::env_functions);
        let env = load_environment(&self.env, functions)?;
        self.env_nulls = env.nulls();
        Ok(env)
    }

    /// Starts a run over the collected functions.
    ///
    /// # Errors
    /// Returns `EnvFunction` if the environment cannot be built, or
    /// `MissingParameter` if a function needs a key the environment lacks.
    pub fn stream(&mut self) -> Result<RunStream<'_>> {
        let total = self.collected.len();
        self.progress.report(0, total, progress::RUN_START, None);
        self.start_time = Utc::now();
        self.end_time = self.start_time;
        self.results.clear();
        self.score = 0.0;

        let env = self.load_environments()?;
        for function in self.collected.iter().filter(|f| !f.skip()) {
            if let Some(missing) = function.params().iter().find(|p| !env.contains_key(p.as_str())) {
                return Err(RuleCheckError::MissingParameter {
                    function: function.function_name().to_string(),
                    parameter: missing.clone(),
                });
            }
        }
        tracing::info!(functions = total, "starting rule check");
        Ok(RunStream::new(self, env))
    }

    /// Runs every collected function to completion.
    ///
    /// # Errors
    /// Same as [`stream`](Self::stream).
    pub fn run_all(&mut self) -> Result<&[CheckResult]> {
        self.stream()?.for_each(drop);
        Ok(&self.results)
    }

    pub fn set_env(&mut self, env: Env) {
        self.env = env;
    }

    #[must_use]
    pub const fn env(&self) -> &Env {
        &self.env
    }

    #[must_use]
    pub fn env_nulls(&self) -> &[String] {
        &self.env_nulls
    }

    #[must_use]
    pub fn pre_collected(&self) -> &[CheckFunction] {
        &self.pre_collected
    }

    #[must_use]
    pub fn collected(&self) -> &[CheckFunction] {
        &self.collected
    }

    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    #[must_use]
    pub const fn rule_control(&self) -> Option<&RuleControl> {
        self.rule_control.as_ref()
    }

    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn score_strategy(&self) -> &dyn ScoreStrategy {
        self.score_strategy.as_ref()
    }

    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    #[must_use]
    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        (self.end_time - self.start_time)
            .to_std()
            .map_or(0.0, |d| d.as_secs_f64())
    }

    #[must_use]
    pub fn ruids(&self) -> Vec<String> {
        self.sorted_labels(CheckFunction::ruid)
    }

    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.sorted_labels(CheckFunction::tag)
    }

    #[must_use]
    pub fn phases(&self) -> Vec<String> {
        self.sorted_labels(CheckFunction::phase)
    }

    #[must_use]
    pub fn levels(&self) -> Vec<u32> {
        let levels: BTreeSet<u32> = self.collected.iter().map(CheckFunction::level).collect();
        levels.into_iter().collect()
    }

    fn sorted_labels(&self, get: fn(&CheckFunction) -> &str) -> Vec<String> {
        let labels: BTreeSet<&str> = self.collected.iter().map(get).collect();
        labels.into_iter().map(str::to_string).collect()
    }

    /// No result carries an error.
    #[must_use]
    pub fn clean_run(&self) -> bool {
        self.results.iter().all(|r| r.except.is_none())
    }

    /// Every result passed, none skipped, none warned.
    #[must_use]
    pub fn perfect_run(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.status == Some(true) && !r.skipped && r.warn_msg.is_empty())
    }

    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    #[must_use]
    pub fn warn_count(&self) -> usize {
        self.results.iter().filter(|r| !r.warn_msg.is_empty()).count()
    }

    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_pass() && !r.skipped).count()
    }

    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_fail()).count()
    }

    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn function_count(&self) -> usize {
        self.collected.len()
    }

    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len() + self.packages.iter().map(CheckPackage::module_count).sum::<usize>()
    }

    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|m| m.name().to_string())
            .chain(self.packages.iter().flat_map(CheckPackage::module_names))
            .collect()
    }

    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Summary of what was collected and how it scored.
    #[must_use]
    pub fn header(&self) -> ReportHeader {
        ReportHeader {
            package_count: self.package_count(),
            module_count: self.module_count(),
            modules: self.module_names(),
            function_count: self.function_count(),
            tags: self.tags(),
            levels: self.levels(),
            phases: self.phases(),
            ruids: self.ruids(),
            score: self.score,
            score_strategy: self.score_strategy.name().to_string(),
            env_nulls: self.env_nulls.clone(),
            rule_control: self.rule_control.as_ref().map(RuleControl::summary),
        }
    }

    /// Full report of the last run.
    #[must_use]
    pub fn report(&self) -> Report {
        Report {
            header: self.header(),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds: self.duration_seconds(),
            functions: self
                .collected
                .iter()
                .map(|f| f.function_name().to_string())
                .collect(),
            passed_count: self.pass_count(),
            failed_count: self.fail_count(),
            skip_count: self.skip_count(),
            total_count: self.result_count(),
            results: self.results.iter().map(CheckResult::as_record).collect(),
        }
    }
}

/// Builder for [`Checker`].
pub struct CheckerBuilder {
    packages: Vec<CheckPackage>,
    modules: Vec<CheckModule>,
    functions: Vec<CheckFunction>,
    env: Env,
    rule_control: Option<RuleControl>,
    score_strategy: Box<dyn ScoreStrategy>,
    renderer: Arc<dyn Renderer>,
    progress: Box<dyn Progress + Send>,
    abort_on_fail: bool,
    abort_on_exception: bool,
    auto_setup: bool,
    auto_ruid: bool,
}

impl Default for CheckerBuilder {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            modules: Vec::new(),
            functions: Vec::new(),
            env: Env::new(),
            rule_control: None,
            score_strategy: Box::new(ScoreByResult),
            renderer: Arc::new(MarkupRenderer::default()),
            progress: Box::new(NoProgress),
            abort_on_fail: false,
            abort_on_exception: false,
            auto_setup: false,
            auto_ruid: false,
        }
    }
}

impl CheckerBuilder {
    #[must_use]
    pub fn package(mut self, package: CheckPackage) -> Self {
        self.packages.push(package);
        self
    }

    #[must_use]
    pub fn packages(mut self, packages: impl IntoIterator<Item = CheckPackage>) -> Self {
        self.packages.extend(packages);
        self
    }

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
    pub fn env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn rule_control(mut self, rule_control: RuleControl) -> Self {
        self.rule_control = Some(rule_control);
        self
    }

    #[must_use]
    pub fn score_strategy(mut self, strategy: Box<dyn ScoreStrategy>) -> Self {
        self.score_strategy = strategy;
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn progress(mut self, progress: Box<dyn Progress + Send>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub const fn abort_on_fail(mut self, abort: bool) -> Self {
        self.abort_on_fail = abort;
        self
    }

    #[must_use]
    pub const fn abort_on_exception(mut self, abort: bool) -> Self {
        self.abort_on_exception = abort;
        self
    }

    /// Runs `pre_collect` and `prepare` (without filters) during `build`.
    #[must_use]
    pub const fn auto_setup(mut self, auto_setup: bool) -> Self {
        self.auto_setup = auto_setup;
        self
    }

    #[must_use]
    pub const fn auto_ruid(mut self, auto_ruid: bool) -> Self {
        self.auto_ruid = auto_ruid;
        self
    }

    /// Applies run options from a configuration file.
    ///
    /// # Errors
    /// Returns an error if the configured rule control is invalid or its
    /// source file cannot be loaded.
    pub fn with_config(mut self, config: &CheckerConfig) -> Result<Self> {
        self.abort_on_fail = config.abort_on_fail;
        self.abort_on_exception = config.abort_on_exception;
        self.auto_ruid = config.auto_ruid;
        self.score_strategy = config.score_strategy.strategy();
        self.renderer = Arc::new(MarkupRenderer::new(config.renderer));
        if let Some(spec) = &config.rule_control {
            self.rule_control = Some(RuleControl::from_spec(spec)?);
        } else if let Some(path) = &config.rule_control_file {
            let section = config.rule_control_section.as_deref().unwrap_or_default();
            self.rule_control = Some(load_rule_control(path, section)?);
        }
        Ok(self)
    }

    /// # Errors
    /// Returns `Config` if no package, module or function was given, or any
    /// error from `prepare` when `auto_setup` is set.
    pub fn build(self) -> Result<Checker> {
        if self.packages.is_empty() && self.modules.is_empty() && self.functions.is_empty() {
            return Err(RuleCheckError::Config(
                "You must provide at least one package, module or function to check.".to_string(),
            ));
        }

        let check_functions = self
            .functions
            .into_iter()
            .enumerate()
            .map(|(i, mut f)| {
                f.set_module(ADHOC_MODULE);
                f.set_index(i + 1);
                f
            })
            .collect();

        let now = Utc::now();
        let mut checker = Checker {
            packages: self.packages,
            modules: self.modules,
            check_functions,
            pre_collected: Vec::new(),
            collected: Vec::new(),
            results: Vec::new(),
            env: self.env,
            env_nulls: Vec::new(),
            rule_control: self.rule_control,
            score_strategy: self.score_strategy,
            renderer: self.renderer,
            progress: self.progress,
            abort_on_fail: self.abort_on_fail,
            abort_on_exception: self.abort_on_exception,
            auto_ruid: self.auto_ruid,
            score: 0.0,
            start_time: now,
            end_time: now,
        };
        if self.auto_setup {
            checker.pre_collect();
            checker.prepare(&[])?;
        }
        Ok(checker)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
