use std::collections::HashMap;
use std::sync::Mutex;

use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::store::{ContentStore, TopicRecord};

/// In-process [`ContentStore`] for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    topics: Mutex<HashMap<String, TopicRecord>>,
    blobs: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }
}

fn poisoned<T>(_: T) -> SlidecastError {
    SlidecastError::persistence("memory store lock poisoned")
}

impl ContentStore for MemoryStore {
    fn find(&self, topic: &str) -> SlidecastResult<Option<TopicRecord>> {
        Ok(self.topics.lock().map_err(poisoned)?.get(topic).cloned())
    }

    fn upsert(&self, topic: &str, record: &TopicRecord) -> SlidecastResult<()> {
        self.topics
            .lock()
            .map_err(poisoned)?
            .insert(topic.to_string(), record.clone());
        Ok(())
    }

    fn get_blob(&self, id: &str) -> SlidecastResult<Vec<u8>> {
        self.blobs
            .lock()
            .map_err(poisoned)?
            .get(id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| SlidecastError::persistence(format!("no blob '{id}'")))
    }

    fn put_blob(&self, bytes: &[u8], filename: &str) -> SlidecastResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.blobs
            .lock()
            .map_err(poisoned)?
            .insert(id.clone(), (filename.to_string(), bytes.to_vec()));
        Ok(id)
    }
}
