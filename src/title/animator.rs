use std::path::Path;

use rayon::prelude::*;

use crate::config::TitleConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::SinkConfig;
use crate::foundation::core::{Canvas, Fps, FrameIndex, Point};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::mux::{VideoSegment, stream_frames};
use crate::render::frame::{FrameRGBA, FrameSource};
use crate::render::raster::{Raster, blit_over};
use crate::text::engine::{TextBrush, TextEngine, TextStyle};
use crate::text::layout::split_title;
use crate::title::glyphs::{Glyph, find_glyphs};
use crate::title::trajectory::Trajectory;

const CHUNK_FRAMES: u64 = 24;

/// Builds animated title clips from a title string.
pub struct TitleAnimator {
    cfg: TitleConfig,
    fps: Fps,
    engine: TextEngine,
}

impl TitleAnimator {
    /// Create an animator; the title font is resolved once here.
    pub fn new(cfg: &TitleConfig, fps: Fps) -> Self {
        Self {
            cfg: cfg.clone(),
            fps,
            engine: TextEngine::new(cfg.font_path.as_deref()),
        }
    }

    /// Render `title` at rest and cut it into independently moving glyphs.
    pub fn animate(&mut self, title: &str) -> SlidecastResult<TitleClip> {
        let resting = self.render_resting(title)?;
        let glyphs = find_glyphs(&resting, u64::from(self.cfg.min_glyph_area));
        let count = glyphs.len();
        let trajectories = glyphs
            .iter()
            .enumerate()
            .map(|(index, g)| Trajectory {
                base: g.origin,
                index,
                count,
                params: self.cfg.motion,
            })
            .collect();

        let len_frames = self.fps.secs_to_frames_round(self.cfg.duration_secs).max(1);
        tracing::debug!(title, glyphs = count, frames = len_frames, "title animated");

        Ok(TitleClip {
            canvas: self.cfg.canvas,
            fps: self.fps,
            background: self.cfg.background_rgb.to_rgba(),
            len_frames,
            glyphs,
            trajectories,
            cached: None,
        })
    }

    /// Encode the animated `title` as a silent clip at `out`.
    pub fn animate_to_file(&mut self, title: &str, out: &Path) -> SlidecastResult<VideoSegment> {
        let mut clip = self.animate(title)?;
        let canvas = clip.canvas();
        let mut sink =
            FfmpegSink::new(FfmpegSinkOpts::new(out).with_background(self.cfg.background_rgb));
        let (fps, len) = (clip.fps(), clip.len_frames());
        stream_frames(&mut clip, len, SinkConfig::video_only(canvas, fps), &mut sink)?;

        Ok(VideoSegment {
            path: out.to_path_buf(),
            duration_secs: clip.duration_secs(),
            frames: clip.len_frames(),
            canvas,
        })
    }

    /// The title with every glyph at its resting position, on a transparent canvas.
    pub fn render_resting(&mut self, title: &str) -> SlidecastResult<FrameRGBA> {
        let canvas = self.cfg.canvas;
        let style = TextStyle {
            size_px: self.cfg.font_size,
            letter_spacing: self.cfg.letter_spacing,
            brush: TextBrush::from(self.cfg.text_rgb),
        };
        let [first, step] = self.cfg.line_anchors;

        let mut raster = Raster::new(canvas)?;
        for (i, line) in split_title(title, self.cfg.split_chars).iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let layout = self.engine.layout_line(line, style);
            let x = (f64::from(canvas.width) - f64::from(layout.width())) / 2.0;
            let y = f64::from(canvas.height) * (first + i as f64 * step);
            raster.draw_layout(&layout, x, y);
        }
        Ok(raster.finish())
    }
}

/// An animated title held in memory as glyph sprites and their trajectories.
///
/// Frames are produced on demand over an opaque background. Consecutive frames are rendered in
/// parallel chunks.
pub struct TitleClip {
    canvas: Canvas,
    fps: Fps,
    background: [u8; 4],
    len_frames: u64,
    glyphs: Vec<Glyph>,
    trajectories: Vec<Trajectory>,
    cached: Option<(u64, Vec<FrameRGBA>)>,
}

impl TitleClip {
    /// Number of animated glyphs.
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Trajectory of every glyph, in glyph order.
    pub fn trajectories(&self) -> &[Trajectory] {
        &self.trajectories
    }

    /// Top-left of every glyph at frame `idx`.
    pub fn positions_at(&self, idx: FrameIndex) -> Vec<Point> {
        let t = self.fps.frames_to_secs(idx.0);
        self.trajectories.iter().map(|tr| tr.position_at(t)).collect()
    }

    fn render_frame(&self, idx: FrameIndex) -> FrameRGBA {
        let mut frame = FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.background.repeat(self.canvas.rgba_len() / 4),
            premultiplied: true,
        };
        for (glyph, pos) in self.glyphs.iter().zip(self.positions_at(idx)) {
            blit_over(
                &mut frame,
                &glyph.sprite,
                pos.x.round() as i64,
                pos.y.round() as i64,
            );
        }
        frame
    }
}

impl FrameSource for TitleClip {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fps(&self) -> Fps {
        self.fps
    }

    fn len_frames(&self) -> u64 {
        self.len_frames
    }

    fn frame(&mut self, idx: FrameIndex) -> SlidecastResult<FrameRGBA> {
        if self.len_frames == 0 {
            return Err(SlidecastError::validation("title clip has no frames"));
        }
        let idx = idx.0.min(self.len_frames - 1);

        if let Some((start, frames)) = &self.cached
            && let Some(frame) = idx
                .checked_sub(*start)
                .and_then(|off| frames.get(off as usize))
        {
            return Ok(frame.clone());
        }

        let end = (idx + CHUNK_FRAMES).min(self.len_frames);
        let frames: Vec<FrameRGBA> = (idx..end)
            .into_par_iter()
            .map(|i| self.render_frame(FrameIndex(i)))
            .collect();
        let first = frames[0].clone();
        self.cached = Some((idx, frames));
        Ok(first)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/title/animator.rs"]
mod tests;
