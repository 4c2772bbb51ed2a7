use std::fmt;

/// The pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Representation,
    Assembly,
    Inference,
    Annotation,
    Aggregation,
    Shaping,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Loading => "Loading reference artifacts",
            Stage::Representation => "Embedding compounds",
            Stage::Assembly => "Assembling strain features",
            Stage::Inference => "Scoring compound-strain pairs",
            Stage::Annotation => "Annotating Gram stains",
            Stage::Aggregation => "Aggregating scores",
            Stage::Shaping => "Shaping result table",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    StageStart(Stage),
    StageFinish(Stage),
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `f` between a start and a finish event for `stage`.
    ///
    /// The finish event is only sent when `f` succeeds.
    pub fn stage<T, E>(&self, stage: Stage, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.report(Progress::StageStart(stage));
        let out = f()?;
        self.report(Progress::StageFinish(stage));
        Ok(out)
    }
}
