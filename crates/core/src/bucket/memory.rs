//! In-memory bucket storage.
//!
//! A map of buckets behind a tokio RwLock for concurrent access. Used
//! by tests and by hosts that do not need the cache to survive a
//! restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BucketStore, RequestKey, StoredResponse};
use crate::Error;

/// In-memory bucket store.
///
/// Cloning is cheap; clones share the same underlying buckets.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    buckets: Arc<RwLock<HashMap<String, HashMap<String, StoredResponse>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BucketStore for MemoryStore {
    async fn open_bucket(&self, name: &str) -> Result<(), Error> {
        let mut buckets = self.buckets.write().await;
        buckets.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, Error> {
        let buckets = self.buckets.read().await;
        let mut names: Vec<String> = buckets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_bucket(&self, name: &str) -> Result<bool, Error> {
        let mut buckets = self.buckets.write().await;
        Ok(buckets.remove(name).is_some())
    }

    async fn put(&self, bucket: &str, request: &RequestKey, response: StoredResponse) -> Result<(), Error> {
        let mut buckets = self.buckets.write().await;
        let entries = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::BucketMissing(bucket.to_string()))?;
        entries.insert(request.storage_key(), response);
        Ok(())
    }

    async fn match_entry(&self, bucket: &str, request: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .and_then(|entries| entries.get(&request.storage_key()))
            .cloned())
    }

    async fn count_entries(&self, bucket: &str) -> Result<u64, Error> {
        let buckets = self.buckets.read().await;
        Ok(buckets.get(bucket).map_or(0, |entries| entries.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(body: &str) -> StoredResponse {
        StoredResponse::new(200, vec![("content-type".to_string(), "text/html".to_string())], body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let store = MemoryStore::new();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("hello")).await.unwrap();
        store.open_bucket("v1").await.unwrap();

        assert_eq!(store.list_buckets().await.unwrap(), vec!["v1".to_string()]);
        assert_eq!(store.count_entries("v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let store = MemoryStore::new();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("hello")).await.unwrap();

        let found = store.match_entry("v1", &request).await.unwrap().unwrap();
        assert_eq!(found.body, b"hello");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        let request = RequestKey::get("https://example.com/").unwrap();

        store.open_bucket("v1").await.unwrap();
        store.put("v1", &request, make_response("old")).await.unwrap();
        store.put("v1", &request, make_response("new")).await.unwrap();

        assert_eq!(store.count_entries("v1").await.unwrap(), 1);
        let found = store.match_entry("v1", &request).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
    }

    #[tokio::test]
    async fn test_put_missing_bucket() {
        let store = MemoryStore::new();
        let request = RequestKey::get("https://example.com/").unwrap();

        let result = store.put("nope", &request, make_response("x")).await;
        assert!(matches!(result, Err(Error::BucketMissing(_))));
    }

    #[tokio::test]
    async fn test_match_missing() {
        let store = MemoryStore::new();
        let request = RequestKey::get("https://example.com/").unwrap();

        assert!(store.match_entry("nope", &request).await.unwrap().is_none());

        store.open_bucket("v1").await.unwrap();
        assert!(store.match_entry("v1", &request).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_bucket() {
        let store = MemoryStore::new();
        store.open_bucket("v1").await.unwrap();
        store.open_bucket("v2").await.unwrap();

        assert!(store.delete_bucket("v1").await.unwrap());
        assert!(!store.delete_bucket("v1").await.unwrap());
        assert_eq!(store.list_buckets().await.unwrap(), vec!["v2".to_string()]);
    }
}
