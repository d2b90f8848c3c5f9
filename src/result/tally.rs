use super::CheckResult;

/// Counts passes and fails of the results flowing through a check.
///
/// Lets a check body report results as it goes and ask for totals at the end
/// without keeping its own counters.
#[derive(Debug, Clone, Default)]
pub struct ResultTally {
    count: usize,
    fail_count: usize,
    summary_only: bool,
    summary_name: String,
}

impl ResultTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A tally whose `summarize` uses `name` when none is given.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            summary_name: name.into(),
            ..Self::default()
        }
    }

    /// Suppress pass-through; only the summary is reported.
    #[must_use]
    pub const fn summary_only(mut self, summary_only: bool) -> Self {
        self.summary_only = summary_only;
        self
    }

    /// Counts `result` and hands it back unless the tally is summary-only.
    pub fn record(&mut self, result: CheckResult) -> Option<CheckResult> {
        self.count += 1;
        if result.status != Some(true) {
            self.fail_count += 1;
        }
        (!self.summary_only).then_some(result)
    }

    /// Pass-through adapter that counts every result of `results`.
    pub fn track<I>(&mut self, results: I) -> Tracked<'_, I::IntoIter>
    where
        I: IntoIterator<Item = CheckResult>,
    {
        Tracked {
            tally: self,
            inner: results.into_iter(),
        }
    }

    #[must_use]
    pub const fn yielded(&self) -> bool {
        self.count > 0
    }

    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn fail_count(&self) -> usize {
        self.fail_count
    }

    #[must_use]
    pub const fn pass_count(&self) -> usize {
        self.count - self.fail_count
    }

    /// `(pass, fail, total)`
    #[must_use]
    pub const fn counts(&self) -> (usize, usize, usize) {
        (self.pass_count(), self.fail_count, self.count)
    }

    /// Summary result: passes iff nothing failed.
    #[must_use]
    pub fn summarize(&self, name: &str, msg: &str) -> CheckResult {
        let name = if name.is_empty() {
            self.summary_name.as_str()
        } else {
            name
        };
        let msg = if msg.is_empty() {
            format!(
                "{name} had {} pass and {} fail.",
                self.pass_count(),
                self.fail_count
            )
        } else {
            msg.to_string()
        };
        CheckResult {
            summary_result: true,
            ..CheckResult::new(self.fail_count == 0, msg)
        }
    }
}

/// Iterator returned by [`ResultTally::track`].
pub struct Tracked<'a, I> {
    tally: &'a mut ResultTally,
    inner: I,
}

impl<I: Iterator<Item = CheckResult>> Iterator for Tracked<'_, I> {
    type Item = CheckResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let result = self.inner.next()?;
            if let Some(result) = self.tally.record(result) {
                return Some(result);
            }
        }
    }
}

#[cfg(test)]
#[path = "tally_tests.rs"]
mod tests;
