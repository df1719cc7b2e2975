//! Cache storage abstraction: named buckets of request -> response snapshots.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::request::{RequestKey, Response};

/// Abstraction over the host's cache storage for testability.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens the named bucket, creating it if absent.
    async fn open(&self, name: &str) -> Result<()>;

    /// Lists bucket names in creation order.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Deletes a bucket. Returns `false` if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Looks up an entry in the named bucket.
    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<Response>>;

    /// Stores an entry in the named bucket, replacing any existing one.
    async fn put(&self, name: &str, key: RequestKey, response: Response) -> Result<()>;
}

#[derive(Debug, Default)]
struct Bucket {
    name: String,
    entries: HashMap<RequestKey, Response>,
}

/// In-process cache storage.
///
/// Mirrors browser cache semantics: only `GET` requests can be stored and
/// partial (206) responses are rejected.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    buckets: RwLock<Vec<Bucket>>,
}

impl MemoryCacheStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the named bucket, if it exists.
    pub async fn len(&self, name: &str) -> Option<usize> {
        self.buckets
            .read()
            .await
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.entries.len())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        if !buckets.iter().any(|b| b.name == name) {
            buckets.push(Bucket {
                name: name.to_string(),
                entries: HashMap::new(),
            });
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .map(|b| b.name.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|b| b.name != name);
        Ok(buckets.len() != before)
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<Response>> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .find(|b| b.name == name)
            .and_then(|b| b.entries.get(key).cloned()))
    }

    async fn put(&self, name: &str, key: RequestKey, response: Response) -> Result<()> {
        if key.method != "GET" {
            return Err(Error::Cache(format!(
                "Request method '{}' is unsupported",
                key.method
            )));
        }
        if response.status == 206 {
            return Err(Error::Cache(
                "Partial response (status code 206) is unsupported".to_string(),
            ));
        }
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::Cache(format!("cache '{name}' is not open")))?;
        bucket.entries.insert(key, response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(method: &str, url: &str) -> RequestKey {
        RequestKey::new(method, &Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn open_is_idempotent_and_ordered() {
        let storage = MemoryCacheStorage::new();
        storage.open("fitness-app-v1").await.unwrap();
        storage.open("fitness-app-v2").await.unwrap();
        storage.open("fitness-app-v1").await.unwrap();
        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["fitness-app-v1", "fitness-app-v2"]
        );
    }

    #[tokio::test]
    async fn put_then_match() {
        let storage = MemoryCacheStorage::new();
        storage.open("c").await.unwrap();
        let k = key("GET", "http://localhost/manifest.json");
        storage
            .put("c", k.clone(), Response::new(200, "{}"))
            .await
            .unwrap();

        let hit = storage.match_in("c", &k).await.unwrap().unwrap();
        assert_eq!(hit.body, "{}");
        assert_eq!(storage.len("c").await, Some(1));
        assert!(storage.match_in("other", &k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let storage = MemoryCacheStorage::new();
        storage.open("c").await.unwrap();
        let k = key("GET", "http://localhost/css/index.css");
        storage.put("c", k.clone(), Response::new(200, "old")).await.unwrap();
        storage.put("c", k.clone(), Response::new(200, "new")).await.unwrap();
        assert_eq!(storage.match_in("c", &k).await.unwrap().unwrap().body, "new");
        assert_eq!(storage.len("c").await, Some(1));
    }

    #[tokio::test]
    async fn put_rejects_non_get() {
        let storage = MemoryCacheStorage::new();
        storage.open("c").await.unwrap();
        let result = storage
            .put("c", key("POST", "http://localhost/api/rest-days"), Response::new(200, ""))
            .await;
        assert!(matches!(result, Err(Error::Cache(_))));
        assert_eq!(storage.len("c").await, Some(0));
    }

    #[tokio::test]
    async fn put_rejects_partial_response() {
        let storage = MemoryCacheStorage::new();
        storage.open("c").await.unwrap();
        let result = storage
            .put("c", key("GET", "http://localhost/video.mp4"), Response::new(206, ""))
            .await;
        assert!(matches!(result, Err(Error::Cache(_))));
    }

    #[tokio::test]
    async fn put_requires_open_bucket() {
        let storage = MemoryCacheStorage::new();
        let result = storage
            .put("missing", key("GET", "http://localhost/"), Response::new(200, ""))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let storage = MemoryCacheStorage::new();
        storage.open("c").await.unwrap();
        assert!(storage.delete("c").await.unwrap());
        assert!(!storage.delete("c").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
