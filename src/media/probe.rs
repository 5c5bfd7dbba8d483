use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Sample rate every segment's audio track is encoded at.
pub const MIX_SAMPLE_RATE: u32 = 48_000;
/// Channel count every segment's audio track is encoded with.
pub const MIX_CHANNELS: u16 = 2;

/// A narration audio file on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioAsset {
    /// Audio file.
    pub path: PathBuf,
    /// Playback length.
    pub duration_secs: f64,
    /// Native sample rate, when known.
    pub sample_rate: u32,
    /// Native channel count, when known.
    pub channels: u16,
}

impl AudioAsset {
    /// Probe `path` and describe it.
    pub fn open(path: &Path) -> SlidecastResult<Self> {
        probe_audio(path)
    }
}

/// Decoded interleaved PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Interleaved samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }

    /// Pad with silence or truncate to exactly `frames` sample frames.
    pub fn fit_to_frames(&mut self, frames: usize) {
        self.interleaved_f32
            .resize(frames * usize::from(self.channels), 0.0);
    }
}

/// Basic stream facts of an encoded video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    /// Frame size.
    pub canvas: Canvas,
    /// Container duration.
    pub duration_secs: f64,
    /// Whether an audio stream is present.
    pub has_audio: bool,
}

/// Describe an audio file. WAV headers are read directly; other formats go through `ffprobe`.
pub fn probe_audio(path: &Path) -> SlidecastResult<AudioAsset> {
    if is_wav(path)
        && let Ok(reader) = hound::WavReader::open(path)
    {
        let spec = reader.spec();
        if spec.sample_rate == 0 || spec.channels == 0 {
            return Err(SlidecastError::encoding(format!(
                "wav '{}' has an empty format header",
                path.display()
            )));
        }
        let frames = reader.duration();
        return Ok(AudioAsset {
            path: path.to_path_buf(),
            duration_secs: f64::from(frames) / f64::from(spec.sample_rate),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        });
    }

    let parsed = run_ffprobe(path)?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| {
            SlidecastError::encoding(format!("no audio stream in '{}'", path.display()))
        })?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| {
            SlidecastError::encoding(format!("ffprobe reported no duration for '{}'", path.display()))
        })?;

    Ok(AudioAsset {
        path: path.to_path_buf(),
        duration_secs,
        sample_rate: stream
            .sample_rate
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        channels: stream.channels.unwrap_or(0),
    })
}

/// Describe an encoded video file with `ffprobe`.
pub fn probe_video(path: &Path) -> SlidecastResult<VideoInfo> {
    let parsed = run_ffprobe(path)?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            SlidecastError::encoding(format!("no video stream in '{}'", path.display()))
        })?;
    let width = video
        .width
        .ok_or_else(|| SlidecastError::encoding("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| SlidecastError::encoding("missing video height from ffprobe"))?;
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoInfo {
        canvas: Canvas::new(width, height)?,
        duration_secs,
        has_audio: parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio")),
    })
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    sample_rate: Option<String>,
    channels: Option<u16>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

fn run_ffprobe(path: &Path) -> SlidecastResult<ProbeOut> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| SlidecastError::encoding(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SlidecastError::encoding(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    serde_json::from_slice(&out.stdout)
        .map_err(|e| SlidecastError::encoding(format!("ffprobe json parse failed: {e}")))
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Decode any audio file with `ffmpeg`, resampled to `sample_rate` and mixed to stereo.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> SlidecastResult<AudioPcm> {
    let rate = sample_rate.to_string();
    let channels = MIX_CHANNELS.to_string();
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-vn", "-ac", &channels, "-ar", &rate])
        .args(["-f", "f32le", "-acodec", "pcm_f32le", "pipe:1"])
        .output()
        .map_err(|e| SlidecastError::encoding(format!("run ffmpeg to decode narration: {e}")))?;
    if !out.status.success() {
        return Err(SlidecastError::encoding(format!(
            "decode narration '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let bytes = out.stdout;
    if !bytes.len().is_multiple_of(4) {
        return Err(SlidecastError::encoding(format!(
            "decoded narration '{}' ends mid-sample",
            path.display()
        )));
    }
    let interleaved_f32 = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels: MIX_CHANNELS,
        interleaved_f32,
    })
}

/// Write samples as a headerless little-endian `f32` file.
pub fn write_f32le(samples: &[f32], out_path: &Path) -> SlidecastResult<()> {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    std::fs::write(out_path, bytes)
        .with_context(|| format!("write pcm '{}'", out_path.display()))?;
    Ok(())
}

/// Sample frames covering exactly `video_frames` frames at `fps`.
pub fn samples_for_frames(video_frames: u64, fps: Fps, sample_rate: u32) -> usize {
    let num = u128::from(video_frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + den / 2) / den) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
