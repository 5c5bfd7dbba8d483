use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba_len()],
            premultiplied: true,
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Load a still image file as a straight-alpha frame.
    pub fn load(path: &Path) -> SlidecastResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("decode image '{}'", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            data: img.into_raw(),
            premultiplied: false,
        })
    }
}

/// Anything that can produce frames on demand at a fixed size and rate.
///
/// Frame indices past [`FrameSource::len_frames`] are a caller error; muxing maps them back onto
/// the last frame itself.
pub trait FrameSource {
    /// Frame size.
    fn canvas(&self) -> Canvas;
    /// Native frame rate.
    fn fps(&self) -> Fps;
    /// Native length in frames (at least 1).
    fn len_frames(&self) -> u64;
    /// Produce frame `idx`.
    fn frame(&mut self, idx: FrameIndex) -> SlidecastResult<FrameRGBA>;

    /// Native length in seconds.
    fn duration_secs(&self) -> f64 {
        self.fps().frames_to_secs(self.len_frames())
    }
}

/// A single image held for as long as the consumer asks.
#[derive(Clone, Debug)]
pub struct StillFrame {
    frame: FrameRGBA,
    fps: Fps,
}

impl StillFrame {
    /// Wrap an already decoded frame.
    pub fn new(frame: FrameRGBA, fps: Fps) -> SlidecastResult<Self> {
        if frame.width == 0 || frame.height == 0 {
            return Err(SlidecastError::validation("still frame must be non-empty"));
        }
        if frame.data.len() != frame.canvas().rgba_len() {
            return Err(SlidecastError::validation(
                "still frame data size mismatch with width*height*4",
            ));
        }
        Ok(Self { frame, fps })
    }

    /// Decode `path` into a still.
    pub fn open(path: &Path, fps: Fps) -> SlidecastResult<Self> {
        Self::new(FrameRGBA::load(path)?, fps)
    }
}

impl FrameSource for StillFrame {
    fn canvas(&self) -> Canvas {
        self.frame.canvas()
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn len_frames(&self) -> u64 {
        1
    }

    fn frame(&mut self, _idx: FrameIndex) -> SlidecastResult<FrameRGBA> {
        Ok(self.frame.clone())
    }
}
