use std::io::{IsTerminal, Write};

use indicatif::{ProgressBar, ProgressStyle};

use crate::result::CheckResult;

pub const RUN_START: &str = "Start Rule Check";
pub const RUN_COMPLETE: &str = "Rule Check Complete.";
pub const FUNC_DONE: &str = "Func done.";

/// Receives run progress from the checker.
///
/// Called at run start, per function start, per result (empty `msg`,
/// `result` set), on early exit, per function end and at run end.
/// Implementations must not panic.
pub trait Progress {
    fn report(&mut self, current: usize, total: usize, msg: &str, result: Option<&CheckResult>);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _: usize, _: usize, _: &str, _: Option<&CheckResult>) {}
}

/// Writes each message on its own line and `+`/`-` per result.
#[derive(Debug)]
pub struct DebugProgress<W: Write> {
    out: W,
}

impl<W: Write> DebugProgress<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl DebugProgress<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> Progress for DebugProgress<W> {
    fn report(&mut self, _: usize, _: usize, msg: &str, result: Option<&CheckResult>) {
        if !msg.is_empty() {
            writeln!(self.out, "{msg}").ok();
        }
        if let Some(result) = result {
            let mark = if result.status == Some(true) { '+' } else { '-' };
            write!(self.out, "{mark}").ok();
        }
        self.out.flush().ok();
    }
}

/// Progress bar over the collected functions.
///
/// The bar is hidden in quiet mode or when stderr is not a TTY.
#[derive(Clone)]
pub struct BarProgress {
    progress_bar: ProgressBar,
}

impl BarProgress {
    /// # Panics
    ///
    /// This function will panic if the progress bar template is invalid.
    /// The template is a compile-time constant, so this should never happen.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        Self::new_with_visibility(quiet, is_tty)
    }

    fn new_with_visibility(quiet: bool, is_tty: bool) -> Self {
        let progress_bar = if quiet || !is_tty {
            ProgressBar::hidden()
        } else {
            Self::create_visible_progress_bar()
        };
        Self { progress_bar }
    }

    fn create_visible_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} checks {msg}")
                // SAFETY: Template is a static string with valid format specifiers
                .expect("valid template")
                .progress_chars("█▓░"),
        );
        pb
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.progress_bar.is_hidden()
    }
}

impl Progress for BarProgress {
    fn report(&mut self, current: usize, total: usize, msg: &str, _: Option<&CheckResult>) {
        self.progress_bar.set_length(total as u64);
        self.progress_bar.set_position(current as u64);
        if msg == RUN_COMPLETE {
            self.progress_bar.finish_and_clear();
        } else if !msg.is_empty() {
            self.progress_bar.set_message(msg.to_string());
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
