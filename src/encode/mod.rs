//! Frame consumers used when a title clip or slide is turned into a video segment.
//!
//! [`sink::FrameSink`] fixes the begin/push/end protocol; [`ffmpeg::FfmpegSink`] is the
//! implementation that writes MP4.

/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// The sink protocol and an in-memory sink.
pub mod sink;
