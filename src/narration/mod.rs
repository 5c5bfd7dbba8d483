//! Adapters to the external speech, translation and image generation services.
//!
//! Each service is a synchronous trait so the orchestrator can be driven by in-process fakes.
//! Implementations must never leave a partially written file behind: bytes are written to a
//! scratch file and renamed into place only once complete.

use std::path::{Path, PathBuf};

use crate::foundation::error::SlidecastResult;
use crate::media::probe::AudioAsset;

/// Blocking HTTP adapters.
pub mod http;
/// Retry policy for service calls.
pub mod retry;

/// Speaker and dialect of a voiceover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    /// Speaker (voice) name.
    pub speaker: String,
    /// Dialect, e.g. `hi-IN`.
    pub locale: String,
}

/// Turns narration text into an audio file.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into a new audio file under `out_dir`.
    fn synthesize(&self, text: &str, voice: &Voice, out_dir: &Path) -> SlidecastResult<AudioAsset>;
}

/// Translates narration into the lecture-notes language.
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_locale`.
    fn translate(&self, text: &str, target_locale: &str) -> SlidecastResult<String>;
}

/// Generates a slide illustration from a description.
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for `prompt` into a new file under `out_dir`.
    fn generate(&self, prompt: &str, out_dir: &Path) -> SlidecastResult<PathBuf>;
}
