use std::path::PathBuf;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::mux::VideoSegment;
use crate::media::probe::AudioAsset;
use crate::media::sequence::FinalVideo;
use crate::pipeline::state::{PipelineState, SegmentRef, Stage};
use crate::slide::composer::SlideImage;
use crate::slide::model::Slide;

/// Everything one run produced so far. Lives only for the duration of the run.
#[derive(Debug)]
pub struct PipelineRun {
    topic: String,
    slides: Vec<Slide>,
    history: Vec<PipelineState>,
    /// Narration per rendered segment, title first.
    pub audio: Vec<(SegmentRef, AudioAsset)>,
    /// Composed slide images, keyed by 1-based slide number.
    pub slide_images: Vec<(usize, SlideImage)>,
    /// Encoded segments in timeline order, title first.
    pub segments: Vec<VideoSegment>,
    /// Assembled video, once sequencing succeeded.
    pub final_video: Option<FinalVideo>,
    /// Translated narration, one per rendered slide.
    pub notes: Vec<String>,
}

impl PipelineRun {
    /// Start a run over a frozen copy of `slides`.
    pub fn new(topic: impl Into<String>, slides: &[Slide]) -> Self {
        Self {
            topic: topic.into(),
            slides: slides.to_vec(),
            history: vec![PipelineState::Idle],
            audio: Vec::new(),
            slide_images: Vec::new(),
            segments: Vec::new(),
            final_video: None,
            notes: Vec::new(),
        }
    }

    /// Topic key of the run.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Slides the run was started with.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Current state.
    pub fn state(&self) -> &PipelineState {
        // history always holds at least `Idle`
        &self.history[self.history.len() - 1]
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to `next`, refusing transitions the state machine does not allow.
    pub fn advance(&mut self, next: PipelineState) -> SlidecastResult<()> {
        if !self.state().can_advance_to(&next) {
            return Err(SlidecastError::Other(anyhow::anyhow!(
                "illegal pipeline transition {:?} -> {:?}",
                self.state(),
                next
            )));
        }
        tracing::debug!(topic = %self.topic, state = ?next, "pipeline state");
        self.history.push(next);
        Ok(())
    }

    /// Record a failure of `stage`. Has no effect once the run is terminal.
    pub fn fail(&mut self, stage: Stage, reason: impl Into<String>) {
        let failed = PipelineState::Failed {
            stage,
            reason: reason.into(),
        };
        if self.state().can_advance_to(&failed) {
            self.history.push(failed);
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Topic key.
    pub topic: String,
    /// Assembled video in the run's working directory.
    pub final_video: FinalVideo,
    /// Segments that went into the video, title first.
    pub segments: Vec<VideoSegment>,
    /// Composed slide images, keyed by 1-based slide number.
    pub slide_images: Vec<(usize, SlideImage)>,
    /// Translated lecture notes.
    pub notes: Vec<String>,
    /// Store blob holding the published video.
    pub video_blob_id: String,
    /// Run working directory. Removed after the run unless retention keeps it.
    pub work_dir: PathBuf,
    /// States visited.
    pub history: Vec<PipelineState>,
}
