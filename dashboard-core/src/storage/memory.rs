use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::error::StorageError;

use super::ObjectStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-process store backing `--dry-run` and the test suite.
#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    exists: bool,
    created: bool,
    objects: BTreeMap<String, StoredObject>,
    puts: Vec<String>,
}

impl MemoryStore {
    /// A store whose bucket does not exist yet.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn existing(bucket: impl Into<String>) -> Self {
        let store = Self::new(bucket);
        store.state.lock().exists = true;
        store
    }

    pub fn bucket_created(&self) -> bool {
        self.state.lock().created
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.state.lock().objects.get(key).cloned()
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().objects.keys().cloned().collect()
    }

    /// Every key written, in write order, including overwrites.
    pub fn put_history(&self) -> Vec<String> {
        self.state.lock().puts.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        Ok(self.state.lock().exists)
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.exists = true;
        state.created = true;
        Ok(())
    }

    async fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.puts.push(key.to_string());
        state.objects.insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_but_history_keeps_every_write() {
        let store = MemoryStore::existing("dash");

        store.put("a", b"one", "text/plain").await.unwrap();
        store.put("a", b"two", "text/html").await.unwrap();

        let obj = store.get("a").unwrap();
        assert_eq!(obj.body, b"two");
        assert_eq!(obj.content_type, "text/html");
        assert_eq!(store.keys(), vec!["a"]);
        assert_eq!(store.put_history(), vec!["a", "a"]);
    }
}
