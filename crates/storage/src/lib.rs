//! Attachment storage for Leadline.
//!
//! This crate provides:
//! - The `ObjectStore` abstraction with atomic writes
//! - A local filesystem backend with traversal protection
//! - `FileStore`, which names attachments and builds their public URLs

pub mod backends;
pub mod error;
pub mod files;
pub mod traits;

pub use backends::filesystem::FilesystemBackend;
pub use error::{StorageError, StorageResult};
pub use files::{FileStore, PUBLIC_MOUNT, Upload};
pub use traits::ObjectStore;

use leadline_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path, .. } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}

/// Create the attachment file store from configuration.
pub async fn file_store_from_config(config: &StorageConfig) -> StorageResult<FileStore> {
    let backend = from_config(config).await?;
    Ok(FileStore::new(
        backend,
        config.public_base_url().map(str::to_string),
    ))
}
