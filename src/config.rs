//! Pipeline configuration.
//!
//! Every field has a default so a partial JSON file (or none at all) yields a working setup.
//! Secrets are never stored here: each [`ServiceEndpoint`] names the environment variable that
//! holds its key.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::logging::LoggingConfig;
use crate::narration::retry::RetryPolicy;
use crate::pipeline::workdir::TempRetention;
use crate::title::trajectory::MotionParams;

/// Top-level configuration for one [`crate::Orchestrator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root for per-run working directories.
    pub work_dir: PathBuf,
    /// Output frame rate for every encoded segment.
    pub fps: u32,
    /// Length of the pause clip inserted between segments.
    pub pause_secs: f64,
    /// Pause clip fill color.
    pub pause_rgb: Rgb8,
    /// What happens to a run's working files when it ends.
    pub retention: TempRetention,
    /// Retry policy applied to external service calls.
    pub retry: RetryPolicy,
    /// Animated title settings.
    pub title: TitleConfig,
    /// Slide composition settings.
    pub slide: SlideConfig,
    /// Narration, translation and image generation settings.
    pub narration: NarrationConfig,
    /// File-backed content store settings.
    pub store: StoreConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("slidecast-work"),
            fps: 24,
            pause_secs: 0.1,
            pause_rgb: Rgb8::new(73, 109, 137),
            retention: TempRetention::default(),
            retry: RetryPolicy::default(),
            title: TitleConfig::default(),
            slide: SlideConfig::default(),
            narration: NarrationConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> SlidecastResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            SlidecastError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> SlidecastResult<()> {
        self.fps()?;
        if !self.pause_secs.is_finite() || self.pause_secs <= 0.0 {
            return Err(SlidecastError::validation(
                "pause_secs must be finite and > 0",
            ));
        }
        for (name, canvas) in [("title", self.title.canvas), ("slide", self.slide.canvas)] {
            if canvas.width == 0 || canvas.height == 0 {
                return Err(SlidecastError::validation(format!(
                    "{name} canvas must be non-zero"
                )));
            }
            if !canvas.width.is_multiple_of(2) || !canvas.height.is_multiple_of(2) {
                return Err(SlidecastError::validation(format!(
                    "{name} canvas must have even dimensions (yuv420p output)"
                )));
            }
        }
        if !self.title.duration_secs.is_finite() || self.title.duration_secs <= 0.0 {
            return Err(SlidecastError::validation(
                "title duration_secs must be finite and > 0",
            ));
        }
        if self.title.split_chars == 0 {
            return Err(SlidecastError::validation("title split_chars must be > 0"));
        }
        if self.slide.font_size <= 0.0 || self.title.font_size <= 0.0 {
            return Err(SlidecastError::validation("font sizes must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(SlidecastError::validation("retry max_attempts must be >= 1"));
        }
        Ok(())
    }

    /// Output frame rate as a validated [`Fps`].
    pub fn fps(&self) -> SlidecastResult<Fps> {
        Fps::integer(self.fps)
    }
}

/// Animated title settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Frame size of the title clip.
    pub canvas: Canvas,
    /// Optional font file; system `sans-serif` is used when absent or unreadable.
    pub font_path: Option<PathBuf>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Extra advance between letters, in pixels. Keeps letters separable.
    pub letter_spacing: f32,
    /// Letter color.
    pub text_rgb: Rgb8,
    /// Background the transparent clip is flattened over.
    pub background_rgb: Rgb8,
    /// Clip length.
    pub duration_secs: f64,
    /// Character threshold of the two-line title splitter.
    pub split_chars: usize,
    /// `[first, step]`: line `i` has its top edge at `height * (first + i * step)`.
    pub line_anchors: [f64; 2],
    /// Connected components with a bounding box area at or below this are dropped.
    pub min_glyph_area: u32,
    /// Trajectory constants.
    pub motion: MotionParams,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::FULL_HD,
            font_path: None,
            font_size: 80.0,
            letter_spacing: 5.0,
            text_rgb: Rgb8::WHITE,
            background_rgb: Rgb8::BLACK,
            duration_secs: 5.0,
            split_chars: 25,
            line_anchors: [0.4, 0.15],
            min_glyph_area: 50,
            motion: MotionParams::default(),
        }
    }
}

/// Slide composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Slide image size.
    pub canvas: Canvas,
    /// Background fill.
    pub background_rgb: Rgb8,
    /// Narration text color.
    pub text_rgb: Rgb8,
    /// Optional font file; system `sans-serif` is used when absent or unreadable.
    pub font_path: Option<PathBuf>,
    /// Font size in pixels.
    pub font_size: f32,
    /// Top-left of the first text line.
    pub text_origin: [f32; 2],
    /// Wrap width in pixels.
    pub max_text_width: f32,
    /// Vertical advance between lines.
    pub line_height: f32,
    /// Side of the square the illustration is resized to.
    pub illustration_size: u32,
    /// Top edge of the illustration. It is always centered horizontally.
    pub illustration_top: u32,
    /// Maximum characters of narration per slide.
    pub max_content_chars: usize,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::FULL_HD,
            background_rgb: Rgb8::new(73, 109, 137),
            text_rgb: Rgb8::WHITE,
            font_path: None,
            font_size: 50.0,
            text_origin: [100.0, 100.0],
            max_text_width: 1800.0,
            line_height: 60.0,
            illustration_size: 400,
            illustration_top: 600,
            max_content_chars: 480,
        }
    }
}

/// One external HTTP endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    /// Full request URL.
    pub url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout.
    pub timeout_secs: u64,
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key_env: String::new(),
            timeout_secs: 60,
        }
    }
}

impl ServiceEndpoint {
    fn with(url: &str, api_key_env: &str) -> Self {
        Self {
            url: url.to_string(),
            api_key_env: api_key_env.to_string(),
            ..Self::default()
        }
    }
}

/// Narration, translation and illustration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Speaker (voice) name.
    pub speaker: String,
    /// Dialect of the voiceover.
    pub voice_locale: String,
    /// Language the slides are written in.
    pub source_locale: String,
    /// Target language of the lecture notes.
    pub translation_locale: String,
    /// Narration of the title segment; `{topic}` is substituted.
    pub heading_template: String,
    /// Text-to-speech endpoint.
    pub speech: ServiceEndpoint,
    /// Translation endpoint.
    pub translate: ServiceEndpoint,
    /// Image generation endpoint.
    pub image: ServiceEndpoint,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            speaker: "meera".to_string(),
            voice_locale: "hi-IN".to_string(),
            source_locale: "en-IN".to_string(),
            translation_locale: "hi-IN".to_string(),
            heading_template: "In this video, we will discuss {topic}.".to_string(),
            speech: ServiceEndpoint::with(
                "https://api.sarvam.ai/text-to-speech",
                "SLIDECAST_SPEECH_API_KEY",
            ),
            translate: ServiceEndpoint::with(
                "https://api.sarvam.ai/translate",
                "SLIDECAST_SPEECH_API_KEY",
            ),
            image: ServiceEndpoint::with("", "SLIDECAST_IMAGE_TOKEN"),
        }
    }
}

impl NarrationConfig {
    /// Narration spoken over the title clip.
    pub fn heading_for(&self, topic: &str) -> String {
        self.heading_template.replace("{topic}", topic)
    }
}

/// File-backed content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory for topic records and blobs.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("slidecast-store"),
        }
    }
}
