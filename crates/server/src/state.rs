//! Application state shared across handlers.

use crate::service::LeadService;
use leadline_core::config::AppConfig;
use leadline_metadata::MetadataStore;
use leadline_storage::FileStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Attachment file store.
    pub files: FileStore,
    /// Lead operations.
    pub leads: LeadService,
}

impl AppState {
    pub fn new(config: AppConfig, metadata: Arc<dyn MetadataStore>, files: FileStore) -> Self {
        let leads = LeadService::new(
            metadata.clone(),
            files.clone(),
            config.server.max_upload_bytes,
        );

        Self {
            config: Arc::new(config),
            metadata,
            files,
            leads,
        }
    }
}
