use serde::{Deserialize, Serialize};

use crate::foundation::error::SlidecastError;

/// Stage of a run that can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Input checks, before any side effect.
    Validating,
    /// Title narration, animation and muxing.
    RenderingTitle,
    /// Per-slide illustration, composition, narration and muxing.
    RenderingSlides,
    /// Concatenation into the final video.
    Sequencing,
    /// Lecture-note translation.
    Translating,
    /// Writes into the content store.
    Publishing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validating => "validating input",
            Self::RenderingTitle => "rendering title",
            Self::RenderingSlides => "rendering slides",
            Self::Sequencing => "sequencing",
            Self::Translating => "translating",
            Self::Publishing => "publishing",
        };
        f.write_str(name)
    }
}

/// Lifecycle of one run.
///
/// `Idle -> ValidatingInput -> RenderingTitle -> RenderingSlides{1..N} -> Sequencing ->
/// Translating -> Publishing -> Done`, with `Failed` reachable from every non-terminal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    /// Not started.
    Idle,
    /// Checking the slide list.
    ValidatingInput,
    /// Producing the title segment.
    RenderingTitle,
    /// Producing the segment of the slide at this 1-based position.
    RenderingSlides {
        /// 1-based slide position.
        index: usize,
    },
    /// Joining segments.
    Sequencing,
    /// Translating narration.
    Translating,
    /// Writing to the store.
    Publishing,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed {
        /// Stage that failed.
        stage: Stage,
        /// Human-readable reason.
        reason: String,
    },
}

impl PipelineState {
    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: &PipelineState) -> bool {
        use PipelineState as S;
        if self.is_terminal() {
            return false;
        }
        if matches!(next, S::Failed { .. }) {
            return true;
        }
        match (self, next) {
            (S::Idle, S::ValidatingInput)
            | (S::ValidatingInput, S::RenderingTitle)
            | (S::RenderingTitle, S::RenderingSlides { .. })
            | (S::RenderingSlides { .. }, S::Sequencing)
            | (S::Sequencing, S::Translating)
            | (S::Translating, S::Publishing)
            | (S::Publishing, S::Done) => true,
            (S::RenderingSlides { index: a }, S::RenderingSlides { index: b }) => b > a,
            _ => false,
        }
    }
}

/// Segment an error belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentRef {
    /// The title segment.
    Title,
    /// Slide at this 1-based position in the submitted list.
    Slide(usize),
}

impl std::fmt::Display for SegmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => f.write_str("title"),
            Self::Slide(n) => write!(f, "slide {n}"),
        }
    }
}

/// Failure class reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape; nothing was done.
    Validation,
    /// An external service answered with a failure.
    ExternalService,
    /// Local media write, mux or concatenate failure.
    Encoding,
    /// Store write failure after a valid final video existed.
    Persistence,
}

/// Run failure with the stage and segment it happened in.
#[derive(thiserror::Error, Debug)]
#[error("{stage} failed{}: {source}", segment.map(|s| format!(" at {s}")).unwrap_or_default())]
pub struct PipelineError {
    /// Failing stage.
    pub stage: Stage,
    /// Failing segment, when the failure is tied to one.
    pub segment: Option<SegmentRef>,
    /// Underlying error.
    #[source]
    pub source: SlidecastError,
}

impl PipelineError {
    /// Wrap `source` as a failure of `stage`.
    pub fn new(stage: Stage, segment: Option<SegmentRef>, source: SlidecastError) -> Self {
        Self {
            stage,
            segment,
            source,
        }
    }

    /// Classify the failure.
    pub fn kind(&self) -> ErrorKind {
        if self.stage == Stage::Publishing {
            return ErrorKind::Persistence;
        }
        match &self.source {
            SlidecastError::Validation(_) => ErrorKind::Validation,
            SlidecastError::Service { .. } => ErrorKind::ExternalService,
            SlidecastError::Persistence(_) => ErrorKind::Persistence,
            SlidecastError::Encoding(_) | SlidecastError::Serde(_) | SlidecastError::Other(_) => {
                ErrorKind::Encoding
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
