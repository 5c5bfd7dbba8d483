use std::path::{Path, PathBuf};

use crate::encode::ffmpeg::{ensure_parent_dir, is_ffmpeg_on_path};
use crate::foundation::core::{Canvas, Fps, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::mux::VideoSegment;
use crate::media::probe::{MIX_SAMPLE_RATE, probe_video};

/// Solid-color gap inserted between adjacent segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PauseSpec {
    /// Gap length.
    pub duration_secs: f64,
    /// Gap fill color.
    pub rgb: Rgb8,
}

/// One item of the final timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceEntry {
    /// Segment at this position of the input list.
    Segment(usize),
    /// Pause sized like the segment before it.
    Pause {
        /// Pause width in pixels.
        width: u32,
        /// Pause height in pixels.
        height: u32,
    },
}

/// The assembled lecture video.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalVideo {
    /// Encoded file.
    pub path: PathBuf,
    /// Sum of segment durations plus one pause per adjacent pair.
    pub duration_secs: f64,
    /// Timeline that was encoded.
    pub entries: Vec<SequenceEntry>,
}

/// Interleave segments with pauses: `S0, P, S1, P, ..., S(n-1)`.
pub fn plan_sequence(segments: &[VideoSegment]) -> Vec<SequenceEntry> {
    let mut entries = Vec::with_capacity(segments.len() * 2);
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            let prev = segments[i - 1].canvas;
            entries.push(SequenceEntry::Pause {
                width: prev.width,
                height: prev.height,
            });
        }
        entries.push(SequenceEntry::Segment(i));
    }
    entries
}

/// Final duration of a sequence: segment durations plus `(n - 1)` pauses.
pub fn sequence_duration(segments: &[VideoSegment], pause_secs: f64) -> f64 {
    let total: f64 = segments.iter().map(|s| s.duration_secs).sum();
    total + segments.len().saturating_sub(1) as f64 * pause_secs
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InputRef {
    video: usize,
    audio: usize,
}

/// `ffmpeg` filter graph for `entries`.
///
/// Every entry is centered on a `target` canvas, resampled to `fps` and 48 kHz stereo, then all
/// entries are joined in order.
fn concat_filter(inputs: &[InputRef], target: Canvas, fps: Fps, pad_rgb: Rgb8) -> String {
    let mut graph = String::new();
    for (k, input) in inputs.iter().enumerate() {
        graph.push_str(&format!(
            "[{v}:v]pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color={c},setsar=1,fps={fn_}/{fd},format=yuv420p[v{k}];\
             [{a}:a]aresample={sr},aformat=sample_fmts=fltp:channel_layouts=stereo[a{k}];",
            v = input.video,
            a = input.audio,
            w = target.width,
            h = target.height,
            c = pad_rgb.to_ffmpeg_hex(),
            fn_ = fps.num,
            fd = fps.den,
            sr = MIX_SAMPLE_RATE,
        ));
    }
    for k in 0..inputs.len() {
        graph.push_str(&format!("[v{k}][a{k}]"));
    }
    graph.push_str(&format!("concat=n={}:v=1:a=1[outv][outa]", inputs.len()));
    graph
}

/// Concatenate muxed segments with pauses in between using the system `ffmpeg`.
///
/// The result is written to a scratch file next to `out` and renamed into place, so a failed
/// run never leaves a partial final video.
pub fn concatenate_with_ffmpeg(
    segments: &[VideoSegment],
    pause: &PauseSpec,
    fps: Fps,
    out: &Path,
) -> SlidecastResult<FinalVideo> {
    if segments.is_empty() {
        return Err(SlidecastError::validation("nothing to concatenate"));
    }
    if !pause.duration_secs.is_finite() || pause.duration_secs <= 0.0 {
        return Err(SlidecastError::validation("pause duration must be finite and > 0"));
    }
    if !is_ffmpeg_on_path() {
        return Err(SlidecastError::encoding(
            "ffmpeg is required for concatenation, but was not found on PATH",
        ));
    }

    let mut has_audio = Vec::with_capacity(segments.len());
    for seg in segments {
        let info = probe_video(&seg.path)?;
        if info.canvas != seg.canvas {
            return Err(SlidecastError::encoding(format!(
                "segment '{}' is {}x{}, expected {}x{}",
                seg.path.display(),
                info.canvas.width,
                info.canvas.height,
                seg.canvas.width,
                seg.canvas.height
            )));
        }
        has_audio.push(info.has_audio);
    }

    let target = Canvas {
        width: segments.iter().map(|s| s.canvas.width).max().unwrap_or(0),
        height: segments.iter().map(|s| s.canvas.height).max().unwrap_or(0),
    };
    let entries = plan_sequence(segments);
    let pause_len = format!("{:.6}", pause.duration_secs);

    let mut args: Vec<String> = ["-y", "-loglevel", "error"]
        .into_iter()
        .map(String::from)
        .collect();
    let mut inputs = Vec::with_capacity(entries.len());
    let mut next_input = 0usize;

    for entry in &entries {
        match *entry {
            SequenceEntry::Segment(i) => {
                let seg = &segments[i];
                args.push("-i".to_string());
                args.push(seg.path.display().to_string());
                let video = next_input;
                next_input += 1;
                let audio = if has_audio[i] {
                    video
                } else {
                    push_lavfi(
                        &mut args,
                        &mut next_input,
                        &format!("{:.6}", seg.duration_secs),
                        format!("anullsrc=r={MIX_SAMPLE_RATE}:cl=stereo"),
                    )
                };
                inputs.push(InputRef { video, audio });
            }
            SequenceEntry::Pause { width, height } => {
                let video = push_lavfi(
                    &mut args,
                    &mut next_input,
                    &pause_len,
                    format!(
                        "color=c={}:s={width}x{height}:r={}/{}",
                        pause.rgb.to_ffmpeg_hex(),
                        fps.num,
                        fps.den
                    ),
                );
                let audio = push_lavfi(
                    &mut args,
                    &mut next_input,
                    &pause_len,
                    format!("anullsrc=r={MIX_SAMPLE_RATE}:cl=stereo"),
                );
                inputs.push(InputRef { video, audio });
            }
        }
    }

    args.push("-filter_complex".to_string());
    args.push(concat_filter(&inputs, target, fps, pause.rgb));
    args.extend(
        [
            "-map",
            "[outv]",
            "-map",
            "[outa]",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ]
        .map(String::from),
    );

    ensure_parent_dir(out)?;
    let dir = match out.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let scratch = tempfile::Builder::new()
        .prefix(".concat-")
        .suffix(".mp4")
        .tempfile_in(dir)
        .map_err(|e| SlidecastError::encoding(format!("create concat scratch file: {e}")))?;

    let output = std::process::Command::new("ffmpeg")
        .args(&args)
        .arg(scratch.path())
        .output()
        .map_err(|e| SlidecastError::encoding(format!("failed to spawn ffmpeg: {e}")))?;
    if !output.status.success() {
        return Err(SlidecastError::encoding(format!(
            "ffmpeg concat exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    scratch
        .persist(out)
        .map_err(|e| SlidecastError::encoding(format!("move final video into place: {e}")))?;

    let duration_secs = sequence_duration(segments, pause.duration_secs);
    tracing::info!(
        out = %out.display(),
        segments = segments.len(),
        duration_secs,
        "final video assembled"
    );
    Ok(FinalVideo {
        path: out.to_path_buf(),
        duration_secs,
        entries,
    })
}

fn push_lavfi(args: &mut Vec<String>, next_input: &mut usize, len: &str, source: String) -> usize {
    args.extend(["-f", "lavfi", "-t"].map(String::from));
    args.push(len.to_string());
    args.push("-i".to_string());
    args.push(source);
    *next_input += 1;
    *next_input - 1
}

#[cfg(test)]
#[path = "../../tests/unit/media/sequence.rs"]
mod tests;
