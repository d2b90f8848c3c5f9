use crate::result::CheckResult;

/// One value produced by a streaming check body.
#[derive(Debug, Clone)]
pub enum Yielded {
    Bool(bool),
    Result(CheckResult),
}

impl From<bool> for Yielded {
    fn from(status: bool) -> Self {
        Self::Bool(status)
    }
}

impl From<CheckResult> for Yielded {
    fn from(result: CheckResult) -> Self {
        Self::Result(result)
    }
}

/// Lazily produced values of a check body. An `Err` item ends the stream.
pub type ResultStream = Box<dyn Iterator<Item = anyhow::Result<Yielded>>>;

/// Everything a check body may return.
///
/// All shapes are resolved into a single [`ResultStream`] by [`Outcome::into_stream`].
pub enum Outcome {
    Bool(bool),
    Result(CheckResult),
    Results(Vec<CheckResult>),
    Stream(ResultStream),
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Result(r) => f.debug_tuple("Result").field(r).finish(),
            Self::Results(r) => f.debug_tuple("Results").field(&r.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl Outcome {
    /// A lazy stream of booleans and/or results.
    pub fn stream<I, Y>(values: I) -> Self
    where
        I: IntoIterator<Item = Y>,
        I::IntoIter: 'static,
        Y: Into<Yielded>,
    {
        Self::Stream(Box::new(values.into_iter().map(|v| Ok(v.into()))))
    }

    /// A lazy stream whose items may fail; the first error ends the run of the check.
    pub fn try_stream<I, Y>(values: I) -> Self
    where
        I: IntoIterator<Item = anyhow::Result<Y>>,
        I::IntoIter: 'static,
        Y: Into<Yielded>,
    {
        Self::Stream(Box::new(values.into_iter().map(|v| v.map(Into::into))))
    }

    #[must_use]
    pub fn into_stream(self) -> ResultStream {
        match self {
            Self::Bool(status) => Box::new(std::iter::once(Ok(Yielded::Bool(status)))),
            Self::Result(result) => Box::new(std::iter::once(Ok(Yielded::Result(result)))),
            Self::Results(results) => {
                Box::new(results.into_iter().map(|r| Ok(Yielded::Result(r))))
            }
            Self::Stream(stream) => stream,
        }
    }
}

impl From<bool> for Outcome {
    fn from(status: bool) -> Self {
        Self::Bool(status)
    }
}

impl From<CheckResult> for Outcome {
    fn from(result: CheckResult) -> Self {
        Self::Result(result)
    }
}

impl From<Vec<CheckResult>> for Outcome {
    fn from(results: Vec<CheckResult>) -> Self {
        Self::Results(results)
    }
}
