//! Audio object storage.
//!
//! The gateway only needs three operations: probe an object, upload one and
//! build its public URL. `MemoryStore` backs the tests; `HttpObjectStore`
//! talks to a Supabase-style public bucket over REST.

use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::StatusCode;

use crate::error::StorageError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object. `NotFound` is the cache-miss signal, not a failure.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Upload an object. `AlreadyExists` means another writer won the race;
    /// callers treat it as success because content under a given path is
    /// immutable.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Public URL for an object, valid whether or not it exists yet.
    fn public_url(&self, path: &str) -> String;
}

/// In-memory store used by tests and local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .get(path)
            .map(|v| v.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        use dashmap::mapref::entry::Entry;
        match self.objects.entry(path.to_string()) {
            Entry::Occupied(_) => Err(StorageError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(bytes);
                Ok(())
            }
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}

/// REST client for a public storage bucket.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, bucket: &str, service_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let res = self
            .client
            .get(self.object_url(path))
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| StorageError::Other(anyhow!("storage fetch failed: {e}")))?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound),
            s if s.is_success() => {
                let bytes = res
                    .bytes()
                    .await
                    .map_err(|e| StorageError::Other(anyhow!("storage body read failed: {e}")))?;
                Ok(bytes.to_vec())
            }
            s => Err(StorageError::Other(anyhow!("storage fetch returned {s}"))),
        }
    }

    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let res = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, "audio/mpeg")
            .header(reqwest::header::CACHE_CONTROL, "max-age=31536000")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Other(anyhow!("storage upload failed: {e}")))?;

        match res.status() {
            StatusCode::CONFLICT => Err(StorageError::AlreadyExists),
            s if s.is_success() => Ok(()),
            s => Err(StorageError::Other(anyhow!("storage upload returned {s}"))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }
}
