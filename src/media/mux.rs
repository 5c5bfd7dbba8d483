use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::{FrameSink, PcmInput, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::probe::{
    AudioAsset, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo, samples_for_frames,
    write_f32le,
};
use crate::media::sequence::{FinalVideo, PauseSpec, concatenate_with_ffmpeg};
use crate::render::frame::{FrameRGBA, FrameSource, StillFrame};

/// One encoded audio+visual unit: the title or one slide.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSegment {
    /// Encoded file.
    pub path: PathBuf,
    /// Playback length; equal to the narration length for muxed segments.
    pub duration_secs: f64,
    /// Encoded video frames.
    pub frames: u64,
    /// Frame size.
    pub canvas: Canvas,
}

/// Seam between the orchestrator and the media encoder.
///
/// Implementations must be usable from several runs at once.
pub trait SegmentEncoder: Send + Sync {
    /// Hold a still image for exactly the narration's length.
    fn mux_image(
        &self,
        image: &Path,
        audio: &AudioAsset,
        out: &Path,
    ) -> SlidecastResult<VideoSegment>;

    /// Play a clip under the narration, truncating or holding its last frame as needed.
    fn mux_clip(
        &self,
        clip: &mut dyn FrameSource,
        audio: &AudioAsset,
        out: &Path,
    ) -> SlidecastResult<VideoSegment>;

    /// Join segments in order with a pause between every adjacent pair.
    fn concatenate(
        &self,
        segments: &[VideoSegment],
        pause: &PauseSpec,
        out: &Path,
    ) -> SlidecastResult<FinalVideo>;
}

/// [`SegmentEncoder`] backed by the system `ffmpeg`.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegSegmentEncoder {
    fps: Fps,
}

impl FfmpegSegmentEncoder {
    /// Encoder producing segments at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self { fps }
    }
}

impl SegmentEncoder for FfmpegSegmentEncoder {
    fn mux_image(
        &self,
        image: &Path,
        audio: &AudioAsset,
        out: &Path,
    ) -> SlidecastResult<VideoSegment> {
        let mut still = StillFrame::open(image, self.fps)?;
        mux_source(&mut still, audio, self.fps, out)
    }

    fn mux_clip(
        &self,
        clip: &mut dyn FrameSource,
        audio: &AudioAsset,
        out: &Path,
    ) -> SlidecastResult<VideoSegment> {
        mux_source(clip, audio, self.fps, out)
    }

    fn concatenate(
        &self,
        segments: &[VideoSegment],
        pause: &PauseSpec,
        out: &Path,
    ) -> SlidecastResult<FinalVideo> {
        concatenate_with_ffmpeg(segments, pause, self.fps, out)
    }
}

/// Output frame count for narration of `audio_secs`: rounded to whole frames, at least one.
pub fn frames_for_audio(audio_secs: f64, fps: Fps) -> u64 {
    fps.secs_to_frames_round(audio_secs).max(1)
}

/// Source frame shown at output frame `out_idx`. Past the source end the last frame is held.
pub fn source_frame_for(out_idx: u64, out_fps: Fps, source: &dyn FrameSource) -> FrameIndex {
    let last = source.len_frames().saturating_sub(1);
    let src_fps = source.fps();
    let num = u128::from(out_idx) * u128::from(src_fps.num) * u128::from(out_fps.den);
    let den = u128::from(src_fps.den) * u128::from(out_fps.num);
    let src = u64::try_from(num / den).unwrap_or(u64::MAX);
    FrameIndex(src.min(last))
}

/// Push `frames` output frames of `source` into `sink` at `cfg.fps`.
///
/// Past the end of `source` its last frame is held. Runs of output frames that show the same
/// source frame render it once.
pub fn stream_frames(
    source: &mut dyn FrameSource,
    frames: u64,
    cfg: SinkConfig,
    sink: &mut dyn FrameSink,
) -> SlidecastResult<()> {
    let fps = cfg.fps;
    sink.begin(cfg)?;
    let mut held: Option<(FrameIndex, FrameRGBA)> = None;
    for i in 0..frames {
        let src_idx = source_frame_for(i, fps, source);
        let frame = match held.take() {
            Some((idx, frame)) if idx == src_idx => frame,
            _ => source.frame(src_idx)?,
        };
        sink.push_frame(FrameIndex(i), &frame)?;
        held = Some((src_idx, frame));
    }
    sink.end()
}

/// Encode `source` under `audio` so the segment lasts exactly as long as the narration.
///
/// On failure no file is left at `out`.
pub fn mux_source(
    source: &mut dyn FrameSource,
    audio: &AudioAsset,
    fps: Fps,
    out: &Path,
) -> SlidecastResult<VideoSegment> {
    if !audio.duration_secs.is_finite() || audio.duration_secs < 0.0 {
        return Err(SlidecastError::encoding(format!(
            "narration '{}' has invalid duration {}",
            audio.path.display(),
            audio.duration_secs
        )));
    }

    let result = encode_segment(source, audio, fps, out);
    if result.is_err() {
        let _ = std::fs::remove_file(out);
    }
    result
}

fn encode_segment(
    source: &mut dyn FrameSource,
    audio: &AudioAsset,
    fps: Fps,
    out: &Path,
) -> SlidecastResult<VideoSegment> {
    let frames = frames_for_audio(audio.duration_secs, fps);
    let canvas = source.canvas();

    let mut pcm = decode_audio_f32_stereo(&audio.path, MIX_SAMPLE_RATE)?;
    pcm.fit_to_frames(samples_for_frames(frames, fps, MIX_SAMPLE_RATE));

    ensure_parent_dir(out)?;
    let pcm_dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let pcm_file = tempfile::Builder::new()
        .prefix("narration-")
        .suffix(".f32le")
        .tempfile_in(pcm_dir)
        .map_err(|e| SlidecastError::encoding(format!("create pcm scratch file: {e}")))?;
    write_f32le(&pcm.interleaved_f32, pcm_file.path())?;

    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out));
    let cfg = SinkConfig {
        canvas,
        fps,
        narration: Some(PcmInput {
            path: pcm_file.path().to_path_buf(),
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
        }),
    };
    stream_frames(source, frames, cfg, &mut sink)?;

    tracing::debug!(
        out = %out.display(),
        frames,
        audio_secs = audio.duration_secs,
        "segment muxed"
    );

    Ok(VideoSegment {
        path: out.to_path_buf(),
        duration_secs: audio.duration_secs,
        frames,
        canvas,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/mux.rs"]
mod tests;
