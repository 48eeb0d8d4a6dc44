//! Response envelope and the public lead representation.

use leadline_core::{PageMeta, ValidationErrors};
use leadline_metadata::LeadRow;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// `{success, message?, data?, meta?, error?, errors?}` wrapper shared by
/// every contacts response. Absent members are omitted.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            meta: None,
            error: None,
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            meta: None,
            error: Some(error.into()),
            errors: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl Envelope<()> {
    /// Success without a payload (e.g. delete confirmation).
    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            meta: None,
            error: None,
            errors: None,
        }
    }
}

/// A lead as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct LeadResource {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub message: String,
    pub file_path: Option<String>,
    pub file_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl LeadResource {
    /// Build the representation; `url_for` maps a file store key to its public URL.
    pub fn new(row: LeadRow, url_for: impl Fn(&str) -> String) -> Self {
        let file_url = row.file_path.as_deref().map(url_for);
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            business_name: row.business_name,
            message: row.message,
            file_path: row.file_path,
            file_url,
            created_at: rfc3339(row.created_at),
            updated_at: rfc3339(row.updated_at),
        }
    }
}

fn rfc3339(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}
