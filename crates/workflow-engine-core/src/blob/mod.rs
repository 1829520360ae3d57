//! # Object Store
//!
//! Content-addressed blob repository (spec.md §4.6). A successful [`ObjectStore::put`]
//! is durable before it returns; `get` after `put` always observes the bytes
//! (read-your-write); references are globally unique, stable, and never
//! mutated after creation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::{Result, WorkflowError};

/// Opaque key identifying immutable byte content, keyed by
/// `sha256(bytes)[:16] + random-suffix` (spec.md §6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BlobRef(pub String);

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct BlobMeta {
    pub size_bytes: usize,
    pub mime_type: Option<String>,
    pub etag: String,
}

/// Content-addressed blob store consumed by the Parameter Codec (spec.md §4.4)
/// when a large `image`/`audio`/`document` payload crosses the wire.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, mime_type: Option<String>) -> Result<BlobRef>;
    async fn get(&self, blob_ref: &BlobRef) -> Result<Vec<u8>>;
    async fn head(&self, blob_ref: &BlobRef) -> Result<BlobMeta>;
    /// Used only by retention sweeps; the Executor never calls this.
    async fn delete(&self, blob_ref: &BlobRef) -> Result<()>;
}

fn content_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let hash_prefix = hex_prefix(&digest, 16);
    let suffix: u64 = rand::thread_rng().gen();
    format!("{hash_prefix}-{suffix:016x}")
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    let mut s = String::with_capacity(chars);
    for byte in bytes {
        if s.len() >= chars {
            break;
        }
        s.push_str(&format!("{:02x}", byte));
    }
    s.truncate(chars);
    s
}

struct Entry {
    bytes: Vec<u8>,
    mime_type: Option<String>,
}

/// In-process object store used by tests and by hosts that haven't wired a
/// bucket backend yet. Not durable across process restarts.
#[derive(Default)]
pub struct InMemoryObjectStore {
    blobs: RwLock<HashMap<String, Entry>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bytes: Vec<u8>, mime_type: Option<String>) -> Result<BlobRef> {
        let key = content_key(&bytes);
        let mut guard = self
            .blobs
            .write()
            .map_err(|_| WorkflowError::BlobStoreFailure {
                operation: "put".into(),
                cause: "lock poisoned".into(),
            })?;
        guard.insert(key.clone(), Entry { bytes, mime_type });
        Ok(BlobRef(key))
    }

    async fn get(&self, blob_ref: &BlobRef) -> Result<Vec<u8>> {
        let guard = self
            .blobs
            .read()
            .map_err(|_| WorkflowError::BlobStoreFailure {
                operation: "get".into(),
                cause: "lock poisoned".into(),
            })?;
        guard
            .get(&blob_ref.0)
            .map(|e| e.bytes.clone())
            .ok_or_else(|| WorkflowError::BlobNotFound {
                blob_ref: blob_ref.0.clone(),
            })
    }

    async fn head(&self, blob_ref: &BlobRef) -> Result<BlobMeta> {
        let guard = self
            .blobs
            .read()
            .map_err(|_| WorkflowError::BlobStoreFailure {
                operation: "head".into(),
                cause: "lock poisoned".into(),
            })?;
        let entry = guard
            .get(&blob_ref.0)
            .ok_or_else(|| WorkflowError::BlobNotFound {
                blob_ref: blob_ref.0.clone(),
            })?;
        Ok(BlobMeta {
            size_bytes: entry.bytes.len(),
            mime_type: entry.mime_type.clone(),
            etag: blob_ref.0.clone(),
        })
    }

    async fn delete(&self, blob_ref: &BlobRef) -> Result<()> {
        let mut guard = self
            .blobs
            .write()
            .map_err(|_| WorkflowError::BlobStoreFailure {
                operation: "delete".into(),
                cause: "lock poisoned".into(),
            })?;
        guard.remove(&blob_ref.0);
        Ok(())
    }
}
