//! Database row models.

use leadline_core::{LeadChanges, NewLead};
use sqlx::FromRow;
use time::OffsetDateTime;

/// A persisted contact lead.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: String,
    /// File store key of the attachment, if any.
    pub file_path: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Columns to change on an existing lead. Columns left unset keep the value
/// currently stored.
#[derive(Debug, Clone)]
pub struct LeadUpdate {
    pub changes: LeadChanges,
    /// New attachment key; `None` keeps the stored one.
    pub file_path: Option<String>,
    pub updated_at: OffsetDateTime,
}

impl LeadUpdate {
    pub fn new(changes: LeadChanges) -> Self {
        Self {
            changes,
            file_path: None,
            updated_at: timestamp_now(),
        }
    }

    pub fn with_file_path(mut self, key: impl Into<String>) -> Self {
        self.file_path = Some(key.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.file_path.is_none()
    }
}

/// Column values for a lead about to be inserted.
#[derive(Debug, Clone)]
pub struct NewLeadRow {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: String,
    pub file_path: Option<String>,
    pub created_at: OffsetDateTime,
}

impl NewLeadRow {
    pub fn new(lead: NewLead, file_path: Option<String>) -> Self {
        Self {
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            business_name: lead.business_name,
            message: lead.message,
            file_path,
            created_at: timestamp_now(),
        }
    }
}

/// Current UTC time at whole-second precision.
///
/// Timestamps are stored at second resolution so SQLite's text encoding
/// sorts chronologically.
pub fn timestamp_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
