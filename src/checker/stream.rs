use chrono::Utc;

use crate::env::Env;
use crate::function::CheckRun;
use crate::result::CheckResult;

use super::Checker;
use super::progress::{FUNC_DONE, RUN_COMPLETE};

/// Lazy sequence of results over the collected functions.
///
/// Each result is rendered, appended to the checker's results and then
/// yielded. The run ends when every function is exhausted, on an abort, or
/// when the stream is dropped; ending computes the score.
pub struct RunStream<'a> {
    checker: &'a mut Checker,
    env: Env,
    position: usize,
    current: Option<CheckRun>,
    finished: bool,
}

impl<'a> RunStream<'a> {
    pub(super) fn new(checker: &'a mut Checker, env: Env) -> Self {
        Self {
            checker,
            env,
            position: 0,
            current: None,
            finished: false,
        }
    }

    fn total(&self) -> usize {
        self.checker.collected.len()
    }

    fn progress(&mut self, msg: &str, result: Option<&CheckResult>) {
        let total = self.total();
        self.checker.progress.report(self.position, total, msg, result);
    }

    fn start_next(&mut self) -> bool {
        let Some(function) = self.checker.collected.get(self.position).cloned() else {
            return false;
        };
        self.position += 1;
        self.progress(&format!("Func Start {}", function.function_name()), None);
        tracing::debug!(function = function.function_name(), "running check");

        let run = function.call(&self.env).unwrap_or_else(|err| {
            let msg = err.to_string();
            let traceback = format!("{err:?}");
            CheckRun::single(function, CheckResult::error(msg, err.into(), traceback))
        });
        self.current = Some(run);
        true
    }

    /// Returns true if the run must stop after `result`.
    fn early_exit(&mut self, result: &CheckResult, name: &str, finish_on_fail: bool) -> bool {
        let failed = result.status == Some(false);
        let abort_fail = self.checker.abort_on_fail && failed;
        let abort_exception = self.checker.abort_on_exception && result.except.is_some();
        if abort_fail {
            tracing::warn!(function = name, "aborting run on failure");
            self.progress(&format!("Abort on fail: {name}"), None);
        }
        if abort_exception {
            tracing::warn!(function = name, "aborting run on exception");
            self.progress(&format!("Abort on exception: {name}"), None);
        }
        if abort_fail || abort_exception {
            self.finish();
            return true;
        }
        if finish_on_fail && failed {
            self.progress(&format!("Early exit. {name} failed."), None);
            self.progress(FUNC_DONE, None);
            self.current = None;
            return true;
        }
        false
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.current = None;
        self.checker.end_time = Utc::now();
        self.progress(RUN_COMPLETE, None);

        let score = self.checker.score_strategy.score(&self.checker.results);
        self.checker.score = score;
        let total = self.total();
        self.checker
            .progress
            .report(total, total, &format!("Score = {score:.1}"), None);
        tracing::info!(
            score,
            results = self.checker.results.len(),
            duration_seconds = self.checker.duration_seconds(),
            "rule check complete"
        );
    }
}

impl Iterator for RunStream<'_> {
    type Item = CheckResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.current.is_none() && !self.start_next() {
                self.finish();
                return None;
            }
            let run = self.current.as_mut()?;
            let Some(mut result) = run.next() else {
                self.current = None;
                self.progress(FUNC_DONE, None);
                continue;
            };
            let name = run.function().function_name().to_string();
            let finish_on_fail = run.function().finish_on_fail();

            result.msg_rendered = self.checker.renderer.render(&result.msg);
            self.checker.results.push(result.clone());
            if !self.early_exit(&result, &name, finish_on_fail) {
                self.progress("", Some(&result));
            }
            return Some(result);
        }
    }
}

impl Drop for RunStream<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
