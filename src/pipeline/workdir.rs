use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// What happens to a run's working files when the run ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempRetention {
    /// Always remove.
    Delete,
    /// Remove after success, keep after failure for inspection.
    #[default]
    KeepOnFailure,
    /// Never remove.
    Keep,
}

/// Per-run working directory with `slides/`, `images/`, `audio/` and `videos/` inside.
///
/// The retention policy is applied when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<tempfile::TempDir>,
    path: PathBuf,
    retention: TempRetention,
    succeeded: bool,
    preserve: bool,
}

impl WorkDir {
    /// Create a fresh, uniquely named directory under `root`.
    pub fn create(root: &Path, topic: &str, retention: TempRetention) -> SlidecastResult<Self> {
        std::fs::create_dir_all(root).map_err(|e| {
            SlidecastError::encoding(format!("create work root '{}': {e}", root.display()))
        })?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("run-{}-", slug(topic)))
            .tempdir_in(root)
            .map_err(|e| SlidecastError::encoding(format!("create run directory: {e}")))?;
        let path = dir.path().to_path_buf();
        for sub in ["slides", "images", "audio", "videos"] {
            std::fs::create_dir_all(path.join(sub)).map_err(|e| {
                SlidecastError::encoding(format!("create '{sub}' in run directory: {e}"))
            })?;
        }
        Ok(Self {
            dir: Some(dir),
            path,
            retention,
            succeeded: false,
            preserve: false,
        })
    }

    /// Run directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Composed slide images.
    pub fn slides(&self) -> PathBuf {
        self.path.join("slides")
    }

    /// Generated illustrations.
    pub fn images(&self) -> PathBuf {
        self.path.join("images")
    }

    /// Narration audio.
    pub fn audio(&self) -> PathBuf {
        self.path.join("audio")
    }

    /// Encoded segments and the final video.
    pub fn videos(&self) -> PathBuf {
        self.path.join("videos")
    }

    /// Record that the run finished successfully.
    pub fn mark_success(&mut self) {
        self.succeeded = true;
    }

    /// Keep the files regardless of policy.
    pub fn preserve(&mut self) {
        self.preserve = true;
    }

    fn keeps_files(&self) -> bool {
        if self.preserve {
            return true;
        }
        match self.retention {
            TempRetention::Delete => false,
            TempRetention::KeepOnFailure => !self.succeeded,
            TempRetention::Keep => true,
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        let keep = self.keeps_files();
        if let Some(dir) = self.dir.take() {
            if keep {
                let path = dir.keep();
                tracing::info!(path = %path.display(), "working files kept");
            } else if let Err(e) = dir.close() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove working files");
            }
        }
    }
}

fn slug(topic: &str) -> String {
    let s: String = topic
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if c.is_whitespace() || c == '-' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .take(32)
        .collect();
    if s.is_empty() { "topic".to_string() } else { s }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workdir.rs"]
mod tests;
