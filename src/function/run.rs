use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crate::result::CheckResult;

use super::CheckFunction;
use super::args::Args;
use super::outcome::{ResultStream, Yielded};

enum RunState {
    Pending(Args),
    Single(CheckResult),
    Streaming(ResultStream),
    Done,
}

/// Lazy, finite, non-restartable sequence of results from one invocation.
///
/// The body is invoked on the first call to `next`. Every result is stamped
/// with the function's metadata and a count starting at 1. The first error
/// or panic becomes a single failing result and ends the sequence.
pub struct CheckRun {
    function: CheckFunction,
    state: RunState,
    started: Instant,
    count: usize,
    summary: String,
    mitigation: String,
    owners: Vec<String>,
}

impl CheckRun {
    pub(super) fn new(function: CheckFunction, args: Args) -> Self {
        Self::with_state(function, RunState::Pending(args))
    }

    pub(crate) fn single(function: CheckFunction, result: CheckResult) -> Self {
        Self::with_state(function, RunState::Single(result))
    }

    fn with_state(function: CheckFunction, state: RunState) -> Self {
        let summary = function.summary();
        let mitigation = function.mitigation();
        let owners = function.owners();
        Self {
            function,
            state,
            started: Instant::now(),
            count: 0,
            summary,
            mitigation,
            owners,
        }
    }

    #[must_use]
    pub const fn function(&self) -> &CheckFunction {
        &self.function
    }

    fn stamp(&mut self, mut result: CheckResult) -> CheckResult {
        self.count += 1;
        let f = &self.function;
        result.func_name = f.function_name().to_string();
        result.module_name = f.module_name().to_string();
        result.pkg_name = f.package_name().to_string();
        result.tag = f.tag().to_string();
        result.ruid = f.ruid().to_string();
        result.level = f.level();
        result.phase = f.phase().to_string();
        result.weight = f.weight();
        result.ttl_minutes = f.ttl_minutes();
        result.doc.clone_from(&self.summary);
        result.mitigation.clone_from(&self.mitigation);
        result.owners.clone_from(&self.owners);
        result.count = self.count;
        result.runtime_sec = self.started.elapsed().as_secs_f64();
        result
    }

    fn promote(&mut self, value: Yielded) -> CheckResult {
        let result = match value {
            Yielded::Result(result) => result,
            Yielded::Bool(status) => CheckResult::new(
                status,
                format!(
                    "Ran {}.{:03} level={}",
                    self.function.function_name(),
                    self.count + 1,
                    self.function.level()
                ),
            ),
        };
        self.stamp(result)
    }

    fn exception(&mut self, err: anyhow::Error) -> CheckResult {
        let msg = format!(
            "Exception '{err}' occurred while running {}.{}",
            self.function.module_name(),
            self.function.function_name()
        );
        tracing::debug!(function = self.function.function_name(), error = %err, "check raised");
        let traceback = format!("{err:?}");
        self.stamp(CheckResult::error(msg, err, traceback))
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let text = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow::anyhow!("panic: {text}")
}

impl Iterator for CheckRun {
    type Item = CheckResult;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, RunState::Done) {
            RunState::Done => None,
            RunState::Single(result) => Some(self.stamp(result)),
            RunState::Pending(args) => {
                self.started = Instant::now();
                let body = self.function.body();
                match catch_unwind(AssertUnwindSafe(|| body(&args))) {
                    Ok(Ok(outcome)) => {
                        self.state = RunState::Streaming(outcome.into_stream());
                        self.next()
                    }
                    Ok(Err(err)) => Some(self.exception(err)),
                    Err(payload) => Some(self.exception(panic_error(payload.as_ref()))),
                }
            }
            RunState::Streaming(mut stream) => {
                match catch_unwind(AssertUnwindSafe(|| stream.next())) {
                    Ok(None) => None,
                    Ok(Some(Ok(value))) => {
                        self.state = RunState::Streaming(stream);
                        Some(self.promote(value))
                    }
                    Ok(Some(Err(err))) => Some(self.exception(err)),
                    Err(payload) => Some(self.exception(panic_error(payload.as_ref()))),
                }
            }
        }
    }
}
