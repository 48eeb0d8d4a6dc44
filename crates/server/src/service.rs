//! Lead lifecycle: validation, attachment handling and persistence.
//!
//! File store writes and deletes happen before the row is committed. A failed
//! commit can therefore orphan an uploaded file, but a row never points at a
//! file that was not written.

use crate::metrics;
use leadline_core::lead::{validate_attachment_size, validate_lead_changes, validate_new_lead};
use leadline_core::{LeadFields, PageMeta, PageRequest, ValidationErrors};
use leadline_metadata::{LeadRow, LeadUpdate, MetadataError, MetadataStore, NewLeadRow};
use leadline_storage::{FileStore, StorageError, Upload};
use std::sync::Arc;
use tracing::{info, warn};

/// Namespace attachments are stored under.
pub const ATTACHMENT_NAMESPACE: &str = "contacts";

/// Lead operation failures.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("lead {0} not found")]
    NotFound(i64),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type LeadResult<T> = std::result::Result<T, LeadError>;

/// One page of the lead listing.
#[derive(Debug, Clone)]
pub struct LeadPage {
    pub leads: Vec<LeadRow>,
    pub meta: PageMeta,
}

/// Lead operations over the metadata store and the attachment file store.
#[derive(Clone)]
pub struct LeadService {
    metadata: Arc<dyn MetadataStore>,
    files: FileStore,
    max_upload_bytes: u64,
}

impl LeadService {
    pub fn new(metadata: Arc<dyn MetadataStore>, files: FileStore, max_upload_bytes: u64) -> Self {
        Self {
            metadata,
            files,
            max_upload_bytes,
        }
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    /// List leads newest first.
    pub async fn list(&self, page: PageRequest) -> LeadResult<LeadPage> {
        let total = self.metadata.count_leads().await?;
        let leads = self
            .metadata
            .list_leads(page.offset(), page.per_page())
            .await?;
        let meta = PageMeta::new(page, total, leads.len());
        Ok(LeadPage { leads, meta })
    }

    /// Validate and persist a new lead, storing its attachment first.
    pub async fn create(&self, fields: LeadFields, file: Option<Upload>) -> LeadResult<LeadRow> {
        let lead = self.attachment_errors(file.as_ref()).merge(validate_new_lead(fields))?;

        let file_path = match &file {
            Some(upload) => Some(self.store_attachment(upload).await?),
            None => None,
        };

        let row = self
            .metadata
            .create_lead(&NewLeadRow::new(lead, file_path))
            .await?;

        metrics::LEADS_CREATED.inc();
        info!(
            lead_id = row.id,
            has_attachment = row.file_path.is_some(),
            "lead created"
        );
        Ok(row)
    }

    pub async fn get(&self, id: i64) -> LeadResult<LeadRow> {
        self.metadata
            .get_lead(id)
            .await?
            .ok_or(LeadError::NotFound(id))
    }

    /// Apply a partial update. A new attachment replaces the previous one.
    pub async fn update(
        &self,
        id: i64,
        fields: LeadFields,
        file: Option<Upload>,
    ) -> LeadResult<LeadRow> {
        let lead = self.get(id).await?;
        let changes = self
            .attachment_errors(file.as_ref())
            .merge(validate_lead_changes(fields))?;

        let mut update = LeadUpdate::new(changes);
        if update.is_empty() && file.is_none() {
            return Ok(lead);
        }

        if let Some(upload) = &file {
            if let Some(previous) = &lead.file_path {
                self.discard_attachment(previous, id).await;
            }
            let key = match self.store_attachment(upload).await {
                Ok(key) => key,
                Err(e) => {
                    if let Some(previous) = &lead.file_path {
                        warn!(
                            lead_id = id,
                            key = %previous,
                            "replacement attachment not stored; row still references the removed file"
                        );
                    }
                    return Err(e);
                }
            };
            update = update.with_file_path(key);
        }

        // The row can vanish between the read above and this write.
        let lead = self
            .metadata
            .update_lead(id, &update)
            .await?
            .ok_or(LeadError::NotFound(id))?;

        metrics::LEADS_UPDATED.inc();
        info!(lead_id = id, replaced_attachment = file.is_some(), "lead updated");
        Ok(lead)
    }

    /// Delete a lead and its attachment.
    pub async fn delete(&self, id: i64) -> LeadResult<()> {
        let lead = self.get(id).await?;

        if let Some(key) = &lead.file_path {
            self.discard_attachment(key, id).await;
        }

        if !self.metadata.delete_lead(id).await? {
            return Err(LeadError::NotFound(id));
        }

        metrics::LEADS_DELETED.inc();
        info!(lead_id = id, "lead deleted");
        Ok(())
    }

    /// Public URL of an attachment key.
    pub fn file_url(&self, key: &str) -> String {
        self.files.url(key)
    }

    fn attachment_errors(&self, file: Option<&Upload>) -> ValidationErrors {
        match file.map(|f| validate_attachment_size(f.size(), self.max_upload_bytes)) {
            Some(Err(errors)) => errors,
            _ => ValidationErrors::new(),
        }
    }

    async fn store_attachment(&self, upload: &Upload) -> LeadResult<String> {
        let key = self.files.store(ATTACHMENT_NAMESPACE, upload).await?;
        metrics::record_attachment_stored(upload.size());
        Ok(key)
    }

    /// Best-effort removal of an attachment that is no longer referenced.
    async fn discard_attachment(&self, key: &str, lead_id: i64) {
        match self.files.delete(key).await {
            Ok(true) => {}
            Ok(false) => warn!(lead_id, key, "attachment already missing from file store"),
            Err(e) => {
                metrics::ATTACHMENT_CLEANUP_FAILURES.inc();
                warn!(lead_id, key, error = %e, "failed to delete attachment");
            }
        }
    }
}
