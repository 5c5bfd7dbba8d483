use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::config::SlideConfig;
use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::render::frame::FrameRGBA;
use crate::render::raster::Raster;
use crate::text::engine::{TextBrush, TextEngine, TextStyle};
use crate::text::layout::{TextLine, wrap_text};

/// What happened to a slide's illustration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllustrationStatus {
    /// Resized and pasted.
    Placed,
    /// None was supplied.
    Missing,
    /// Supplied but unusable; the slide was produced with text only.
    Failed(String),
}

/// A composed slide written to disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlideImage {
    /// PNG file.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Outcome for the illustration.
    pub illustration: IllustrationStatus,
}

/// Rasterizes slides: background, wrapped narration text, optional illustration.
pub struct SlideComposer {
    cfg: SlideConfig,
    engine: TextEngine,
}

impl SlideComposer {
    /// Create a composer; the slide font is resolved once here.
    pub fn new(cfg: &SlideConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            engine: TextEngine::new(cfg.font_path.as_deref()),
        }
    }

    fn style(&self) -> TextStyle {
        TextStyle {
            size_px: self.cfg.font_size,
            letter_spacing: 0.0,
            brush: TextBrush::from(self.cfg.text_rgb),
        }
    }

    /// Wrap `content` to the configured text width with the slide font.
    pub fn layout_lines(&mut self, content: &str) -> Vec<TextLine> {
        let style = self.style();
        let max_width = self.cfg.max_text_width;
        let mut metrics = self.engine.metrics(style);
        wrap_text(content, max_width, &mut metrics)
    }

    /// Compose a slide in memory.
    pub fn compose_frame(
        &mut self,
        content: &str,
        illustration: Option<&Path>,
    ) -> SlidecastResult<(FrameRGBA, IllustrationStatus)> {
        let canvas = self.cfg.canvas;
        let style = self.style();
        let [x0, y0] = self.cfg.text_origin;

        let mut raster = Raster::new(canvas)?;
        raster.fill_background(self.cfg.background_rgb);

        for (i, line) in self.layout_lines(content).iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let layout = self.engine.layout_line(&line.text(), style);
            let y = y0 + i as f32 * self.cfg.line_height;
            raster.draw_layout(&layout, f64::from(x0), f64::from(y));
        }

        let status = match illustration {
            None => IllustrationStatus::Missing,
            Some(path) => match self.place_illustration(&mut raster, path) {
                Ok(()) => IllustrationStatus::Placed,
                Err(e) => {
                    tracing::warn!(
                        image = %path.display(),
                        error = %e,
                        "illustration unusable, composing text-only slide"
                    );
                    IllustrationStatus::Failed(e.to_string())
                }
            },
        };

        Ok((raster.finish(), status))
    }

    /// Compose a slide and write it as PNG to `out`.
    pub fn compose(
        &mut self,
        content: &str,
        illustration: Option<&Path>,
        out: &Path,
    ) -> SlidecastResult<SlideImage> {
        let (frame, illustration) = self.compose_frame(content, illustration)?;
        save_png(&frame, out)?;
        tracing::debug!(out = %out.display(), ?illustration, "slide composed");
        Ok(SlideImage {
            path: out.to_path_buf(),
            width: frame.width,
            height: frame.height,
            illustration,
        })
    }

    fn place_illustration(&self, raster: &mut Raster, path: &Path) -> SlidecastResult<()> {
        let side = self.cfg.illustration_size;
        let img = image::open(path)
            .with_context(|| format!("decode illustration '{}'", path.display()))?;
        let resized =
            image::imageops::resize(&img.to_rgba8(), side, side, image::imageops::FilterType::Lanczos3);

        let canvas = raster.canvas();
        let x = (i64::from(canvas.width) - i64::from(side)) / 2;
        raster.draw_image(
            resized.as_raw(),
            side,
            side,
            x as f64,
            f64::from(self.cfg.illustration_top),
        )
    }
}

/// Write a frame as an RGBA PNG.
pub fn save_png(frame: &FrameRGBA, out: &Path) -> SlidecastResult<()> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| SlidecastError::encoding("slide buffer does not match its size"))?;
    ensure_parent_dir(out)?;
    img.save(out)
        .map_err(|e| SlidecastError::encoding(format!("write '{}': {e}", out.display())))
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/slide/composer.rs"]
mod tests;
