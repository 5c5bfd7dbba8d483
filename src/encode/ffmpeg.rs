use std::ffi::OsString;
use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Output options of an [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// MP4 file to write.
    pub out_path: PathBuf,
    /// Replace an existing file instead of failing.
    pub overwrite: bool,
    /// Color translucent pixels are flattened over.
    pub background: Rgb8,
}

impl FfmpegSinkOpts {
    /// Overwriting output to `out_path` over black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgb8::BLACK,
        }
    }

    /// Flatten over `background` instead of black.
    pub fn with_background(mut self, background: Rgb8) -> Self {
        self.background = background;
        self
    }
}

/// A spawned encoder process.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl Encoder {
    fn spawn(args: Vec<OsString>) -> SlidecastResult<Self> {
        let mut child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SlidecastError::encoding(format!("spawn ffmpeg: {e}")))?;
        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SlidecastError::encoding("ffmpeg pipes unavailable"));
        };
        // Drained on its own thread so a chatty ffmpeg never blocks on a full pipe.
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            stdin,
            stderr,
        })
    }

    /// Close stdin, wait for exit and report ffmpeg's own error output on failure.
    fn finish(self) -> SlidecastResult<()> {
        let Self {
            mut child,
            stdin,
            stderr,
        } = self;
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| SlidecastError::encoding(format!("wait for ffmpeg: {e}")))?;
        let log = match stderr.join() {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Ok(Err(e)) => format!("<stderr unreadable: {e}>"),
            Err(_) => "<stderr reader panicked>".to_string(),
        };
        if !status.success() {
            return Err(SlidecastError::encoding(format!("ffmpeg {status}: {log}")));
        }
        Ok(())
    }

    fn abort(mut self) {
        drop(self.stdin);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// [`FrameSink`] that pipes raw RGBA frames into the system `ffmpeg`.
///
/// Produces H.264 `yuv420p` video. When the config carries narration PCM it is encoded as AAC
/// and the output is cut to the shorter stream. Dropping a sink that was never ended kills
/// ffmpeg and removes the partial file.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
    canvas: Option<Canvas>,
    next: u64,
    scratch: Vec<u8>,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
            canvas: None,
            next: 0,
            scratch: Vec::new(),
        }
    }

    /// File this sink writes.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }
}

/// Command line for encoding `cfg` into `out`, excluding the program name.
pub fn encoder_args(cfg: &SinkConfig, out: &Path, overwrite: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if overwrite { "-y" } else { "-n" }, "-loglevel", "error"]);
    // `-r` before `-i` is the input rate of the raw stream.
    push(&[
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.canvas.width, cfg.canvas.height),
        "-r",
        &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i",
        "pipe:0",
    ]);
    match &cfg.narration {
        Some(pcm) => {
            push(&[
                "-f",
                "f32le",
                "-ar",
                &pcm.sample_rate.to_string(),
                "-ac",
                &pcm.channels.to_string(),
                "-i",
            ]);
            args.push(pcm.path.clone().into_os_string());
            args.extend(
                ["-c:a", "aac", "-shortest"]
                    .iter()
                    .map(OsString::from),
            );
        }
        None => args.push("-an".into()),
    }
    args.extend(
        ["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"]
            .iter()
            .map(OsString::from),
    );
    args.push(out.as_os_str().to_owned());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SlidecastResult<()> {
        let Canvas { width, height } = cfg.canvas;
        if width == 0 || height == 0 {
            return Err(SlidecastError::validation("encoder frame size must be non-zero"));
        }
        if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
            return Err(SlidecastError::validation(format!(
                "encoder frame size {width}x{height} must be even for yuv420p"
            )));
        }
        if let Some(pcm) = &cfg.narration
            && (pcm.sample_rate == 0 || pcm.channels == 0)
        {
            return Err(SlidecastError::validation(
                "narration pcm needs a non-zero sample rate and channel count",
            ));
        }
        let out = &self.opts.out_path;
        if !self.opts.overwrite && out.exists() {
            return Err(SlidecastError::validation(format!(
                "'{}' already exists",
                out.display()
            )));
        }
        ensure_parent_dir(out)?;
        if !is_ffmpeg_on_path() {
            return Err(SlidecastError::encoding("ffmpeg not found on PATH"));
        }

        let encoder = Encoder::spawn(encoder_args(&cfg, out, self.opts.overwrite))?;
        tracing::debug!(
            out = %out.display(),
            width,
            height,
            narration = cfg.narration.is_some(),
            "encoder started"
        );
        if let Some(stale) = self.encoder.replace(encoder) {
            stale.abort();
        }
        self.scratch = vec![0u8; cfg.canvas.rgba_len()];
        self.canvas = Some(cfg.canvas);
        self.next = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SlidecastResult<()> {
        let (Some(canvas), Some(encoder)) = (self.canvas, self.encoder.as_mut()) else {
            return Err(SlidecastError::encoding("encoder not started"));
        };
        if idx.0 != self.next {
            return Err(SlidecastError::encoding(format!(
                "frame {} out of order, expected {}",
                idx.0, self.next
            )));
        }
        if frame.canvas() != canvas || frame.data.len() != self.scratch.len() {
            return Err(SlidecastError::validation(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, canvas.width, canvas.height
            )));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.background,
        )?;
        encoder
            .stdin
            .write_all(&self.scratch)
            .map_err(|e| SlidecastError::encoding(format!("write frame {}: {e}", idx.0)))?;
        self.next += 1;
        Ok(())
    }

    fn end(&mut self) -> SlidecastResult<()> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| SlidecastError::encoding("encoder not started"))?;
        self.canvas = None;
        let result = encoder.finish();
        if result.is_err() {
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
        result
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            encoder.abort();
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
    }
}

/// Composite RGBA8 pixels over an opaque `background`.
///
/// `src_is_premul` tells whether `src` color channels are already multiplied by alpha.
pub fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    background: Rgb8,
) -> SlidecastResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidecastError::validation(
            "flatten needs two rgba8 buffers of equal length",
        ));
    }
    let bg = [background.r, background.g, background.b].map(u16::from);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255_u16(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Create the directory `path` will be written into.
pub fn ensure_parent_dir(path: &Path) -> SlidecastResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Whether `ffmpeg -version` runs.
pub fn is_ffmpeg_on_path() -> bool {
    tool_runs("ffmpeg")
}

/// Whether `ffprobe -version` runs.
pub fn is_ffprobe_on_path() -> bool {
    tool_runs("ffprobe")
}

fn tool_runs(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
