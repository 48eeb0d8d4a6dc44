//! Lead repository trait.

use crate::error::MetadataResult;
use crate::models::{LeadRow, LeadUpdate, NewLeadRow};
use async_trait::async_trait;

/// Repository for contact leads (`contacts` table).
#[async_trait]
pub trait LeadRepo: Send + Sync {
    /// Insert a lead. The store assigns `id`; the returned row is as persisted.
    async fn create_lead(&self, lead: &NewLeadRow) -> MetadataResult<LeadRow>;

    /// Get a lead by ID.
    async fn get_lead(&self, id: i64) -> MetadataResult<Option<LeadRow>>;

    /// Write the columns set in `update` and stamp `updated_at`.
    /// Returns the row as persisted, or `None` when no row with `id` exists.
    async fn update_lead(&self, id: i64, update: &LeadUpdate) -> MetadataResult<Option<LeadRow>>;

    /// Delete a lead. Returns `false` when no row with `id` exists.
    async fn delete_lead(&self, id: i64) -> MetadataResult<bool>;

    /// List leads newest first (`created_at DESC, id DESC`).
    async fn list_leads(&self, offset: u64, limit: u32) -> MetadataResult<Vec<LeadRow>>;

    /// Total number of leads.
    async fn count_leads(&self) -> MetadataResult<u64>;
}
