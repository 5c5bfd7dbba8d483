//! Topic records and published video blobs.
//!
//! The pipeline treats the store as a key-value document store plus a blob store with
//! last-write-wins `upsert`; no transactions are assumed.

use serde::{Deserialize, Serialize};

use crate::foundation::error::SlidecastResult;
use crate::slide::model::Slide;

/// JSON-file store.
pub mod fs;
/// In-memory store.
pub mod memory;

/// Everything published for one topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Slides the video was generated from.
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Blob holding the final video, once one was published.
    #[serde(default)]
    pub video_blob_id: Option<String>,
    /// Translated lecture notes, one per rendered slide.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Document + blob store the pipeline publishes into.
pub trait ContentStore: Send + Sync {
    /// Load the record for `topic`, if any.
    fn find(&self, topic: &str) -> SlidecastResult<Option<TopicRecord>>;
    /// Insert or replace the record for `topic`.
    fn upsert(&self, topic: &str, record: &TopicRecord) -> SlidecastResult<()>;
    /// Read a blob.
    fn get_blob(&self, id: &str) -> SlidecastResult<Vec<u8>>;
    /// Store a blob and return its id.
    fn put_blob(&self, bytes: &[u8], filename: &str) -> SlidecastResult<String>;
}
