//! Public file store for lead attachments.
//!
//! Wraps an [`ObjectStore`] with the naming and URL rules attachments follow:
//! every stored file gets a fresh random key under a namespace, keeping only a
//! sanitized extension of the client-supplied filename.

use crate::error::{StorageError, StorageResult};
use crate::traits::ObjectStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Path the storage root is served under by the HTTP server.
pub const PUBLIC_MOUNT: &str = "/storage";

/// Longest extension kept from an uploaded filename.
const MAX_EXTENSION_LEN: usize = 16;

/// An uploaded file as received from the client.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Original filename, used only for its extension.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Publicly readable attachment storage.
#[derive(Clone)]
pub struct FileStore {
    backend: Arc<dyn ObjectStore>,
    public_base_url: Option<String>,
}

impl FileStore {
    pub fn new(backend: Arc<dyn ObjectStore>, public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Self {
            backend,
            public_base_url,
        }
    }

    pub fn backend(&self) -> &Arc<dyn ObjectStore> {
        &self.backend
    }

    /// Store an upload under `namespace` and return its key.
    #[instrument(skip(self, upload), fields(size = upload.data.len()))]
    pub async fn store(&self, namespace: &str, upload: &Upload) -> StorageResult<String> {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(StorageError::InvalidKey("empty namespace".to_string()));
        }

        let stem = Uuid::new_v4().simple();
        let key = match upload.filename.as_deref().and_then(sanitized_extension) {
            Some(ext) => format!("{namespace}/{stem}.{ext}"),
            None => format!("{namespace}/{stem}"),
        };

        self.backend.put(&key, upload.data.clone()).await?;
        debug!(key = %key, "stored attachment");
        Ok(key)
    }

    /// Delete a stored file. Returns `false` when nothing was stored at `key`.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        match self.backend.delete(key).await {
            Ok(()) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.backend.exists(key).await
    }

    /// Public URL for a stored key.
    pub fn url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match &self.public_base_url {
            Some(base) => format!("{base}{PUBLIC_MOUNT}/{key}"),
            None => format!("{PUBLIC_MOUNT}/{key}"),
        }
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        self.backend.health_check().await
    }
}

/// Lowercased ASCII-alphanumeric extension of `filename`, if it has a usable one.
fn sanitized_extension(filename: &str) -> Option<String> {
    // Browsers on Windows may send the full client path.
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > MAX_EXTENSION_LEN {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
