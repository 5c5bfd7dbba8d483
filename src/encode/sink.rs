use std::path::PathBuf;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::frame::FrameRGBA;

/// Stream layout announced to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Frame size; every pushed frame must match it.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Narration track encoded alongside the frames, if any.
    pub narration: Option<PcmInput>,
}

impl SinkConfig {
    /// Silent stream.
    pub fn video_only(canvas: Canvas, fps: Fps) -> Self {
        Self {
            canvas,
            fps,
            narration: None,
        }
    }
}

/// Interleaved `f32le` PCM file.
#[derive(Debug, Clone)]
pub struct PcmInput {
    /// Raw sample file.
    pub path: PathBuf,
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channels.
    pub channels: u16,
}

/// Consumer of a segment's frames.
///
/// `push_frame` receives indices `0, 1, 2, ...` with no gaps.
pub trait FrameSink: Send {
    /// Open the stream.
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()>;
    /// Append one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SlidecastResult<()>;
    /// Close the stream.
    fn end(&mut self) -> SlidecastResult<()>;
}

/// Keeps every frame in memory and enforces the [`FrameSink`] call order.
#[derive(Debug, Default)]
pub struct CaptureSink {
    cfg: Option<SinkConfig>,
    frames: Vec<FrameRGBA>,
    finished: bool,
}

impl CaptureSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout received in `begin`.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames received since the last `begin`, in order.
    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    /// Whether `end` closed the stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for CaptureSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SlidecastResult<()> {
        let Some(cfg) = self.cfg.as_ref() else {
            return Err(SlidecastError::encoding("push_frame before begin"));
        };
        if self.finished {
            return Err(SlidecastError::encoding("push_frame after end"));
        }
        if idx.0 != self.frames.len() as u64 {
            return Err(SlidecastError::encoding(format!(
                "frame {} pushed, expected {}",
                idx.0,
                self.frames.len()
            )));
        }
        if frame.canvas() != cfg.canvas {
            return Err(SlidecastError::encoding(format!(
                "frame is {}x{}, stream is {}x{}",
                frame.width, frame.height, cfg.canvas.width, cfg.canvas.height
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> SlidecastResult<()> {
        if self.cfg.is_none() {
            return Err(SlidecastError::encoding("end before begin"));
        }
        self.finished = true;
        Ok(())
    }
}
