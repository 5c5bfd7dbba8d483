use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::store::{ContentStore, TopicRecord};

/// [`ContentStore`] on the local filesystem.
///
/// Layout: `<root>/topics/<hex(topic)>.json` for records and `<root>/blobs/<id>` for blobs.
/// Every write goes through a scratch file that is renamed into place.
#[derive(Clone, Debug)]
pub struct FsContentStore {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct TopicDoc {
    topic: String,
    #[serde(flatten)]
    record: TopicRecord,
}

impl FsContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> SlidecastResult<Self> {
        let root = root.into();
        for dir in [root.join("topics"), root.join("blobs")] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                SlidecastError::persistence(format!("create '{}': {e}", dir.display()))
            })?;
        }
        Ok(Self { root })
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn topic_path(&self, topic: &str) -> PathBuf {
        let mut name = String::with_capacity(topic.len() * 2 + 5);
        for b in topic.as_bytes() {
            name.push_str(&format!("{b:02x}"));
        }
        name.push_str(".json");
        self.root.join("topics").join(name)
    }

    fn blob_path(&self, id: &str) -> SlidecastResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(SlidecastError::persistence(format!("invalid blob id '{id}'")));
        }
        Ok(self.root.join("blobs").join(id))
    }

    fn write_atomic(&self, dest: &Path, bytes: &[u8]) -> SlidecastResult<()> {
        let dir = dest
            .parent()
            .ok_or_else(|| SlidecastError::persistence("store path has no parent"))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .map_err(|e| SlidecastError::persistence(format!("create scratch file: {e}")))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| SlidecastError::persistence(format!("write scratch file: {e}")))?;
        tmp.persist(dest).map_err(|e| {
            SlidecastError::persistence(format!("move '{}' into place: {e}", dest.display()))
        })?;
        Ok(())
    }
}

fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

impl ContentStore for FsContentStore {
    fn find(&self, topic: &str) -> SlidecastResult<Option<TopicRecord>> {
        let path = self.topic_path(topic);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SlidecastError::persistence(format!(
                    "read '{}': {e}",
                    path.display()
                )));
            }
        };
        let doc: TopicDoc = serde_json::from_slice(&bytes)
            .map_err(|e| SlidecastError::serde(format!("topic record '{}': {e}", path.display())))?;
        Ok(Some(doc.record))
    }

    fn upsert(&self, topic: &str, record: &TopicRecord) -> SlidecastResult<()> {
        let doc = TopicDoc {
            topic: topic.to_string(),
            record: record.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&doc).map_err(|e| SlidecastError::serde(e.to_string()))?;
        self.write_atomic(&self.topic_path(topic), &bytes)
    }

    fn get_blob(&self, id: &str) -> SlidecastResult<Vec<u8>> {
        let path = self.blob_path(id)?;
        std::fs::read(&path)
            .map_err(|e| SlidecastError::persistence(format!("read blob '{id}': {e}")))
    }

    fn put_blob(&self, bytes: &[u8], filename: &str) -> SlidecastResult<String> {
        let name = sanitize_filename(filename);
        let id = if name.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            format!("{}-{name}", uuid::Uuid::new_v4())
        };
        self.write_atomic(&self.blob_path(&id)?, bytes)?;
        tracing::debug!(id, bytes = bytes.len(), "blob stored");
        Ok(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/fs.rs"]
mod tests;
