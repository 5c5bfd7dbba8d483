//! Slidecast renders narrated lecture videos from text slides.
//!
//! A run takes a topic and its slides and produces:
//!
//! - an animated title clip whose letters fly in on damped rotating paths
//! - one still image per slide with wrapped narration text and an illustration
//! - narration audio muxed under every visual, each segment as long as its narration
//! - one final MP4 with short pause clips between segments, published with translated notes
//!
//! The entry point is [`Orchestrator::run`]. External services sit behind the traits in
//! [`narration`] and [`store`], so the whole pipeline can be driven by in-process fakes.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Pipeline configuration.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Tracing subscriber setup.
pub mod logging;
/// Audio/video probing, muxing and sequencing.
pub mod media;
/// Speech, translation and illustration services.
pub mod narration;
/// End-to-end run orchestration.
pub mod pipeline;
/// CPU rasterization.
pub mod render;
/// Slides and slide images.
pub mod slide;
/// Topic records and video blobs.
pub mod store;
/// Text wrapping and shaping.
pub mod text;
/// Animated title clips.
pub mod title;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rgb8, Vec2};
pub use crate::foundation::error::{ServiceKind, SlidecastError, SlidecastResult};

pub use crate::config::PipelineConfig;
pub use crate::media::mux::{FfmpegSegmentEncoder, SegmentEncoder, VideoSegment};
pub use crate::media::probe::AudioAsset;
pub use crate::media::sequence::{FinalVideo, PauseSpec};
pub use crate::pipeline::orchestrator::{Orchestrator, Services};
pub use crate::pipeline::run::RunReport;
pub use crate::pipeline::state::{ErrorKind, PipelineError, PipelineState, SegmentRef, Stage};
pub use crate::render::frame::{FrameRGBA, FrameSource};
pub use crate::slide::composer::SlideComposer;
pub use crate::slide::model::Slide;
pub use crate::store::{ContentStore, TopicRecord};
pub use crate::title::animator::TitleAnimator;
