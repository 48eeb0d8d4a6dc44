//! Metadata store trait and the SQLite implementation.

use crate::error::MetadataResult;
use crate::repos::LeadRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: LeadRepo + Send + Sync {
    /// Create tables and indexes if they do not exist.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` and apply the schema.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // One writer at a time; a single connection avoids "database is locked".
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "opened SQLite lead store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::{LeadRow, LeadUpdate, NewLeadRow};

    #[async_trait]
    impl LeadRepo for SqliteStore {
        async fn create_lead(&self, lead: &NewLeadRow) -> MetadataResult<LeadRow> {
            let row = sqlx::query_as::<_, LeadRow>(
                r#"
                INSERT INTO contacts (name, email, phone, business_name, message, file_path, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.business_name)
            .bind(&lead.message)
            .bind(&lead.file_path)
            .bind(lead.created_at)
            .bind(lead.created_at)
            .fetch_one(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_lead(&self, id: i64) -> MetadataResult<Option<LeadRow>> {
            let row = sqlx::query_as::<_, LeadRow>("SELECT * FROM contacts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn update_lead(
            &self,
            id: i64,
            update: &LeadUpdate,
        ) -> MetadataResult<Option<LeadRow>> {
            let changes = &update.changes;
            let mut query = QueryBuilder::<Sqlite>::new("UPDATE contacts SET updated_at = ");
            query.push_bind(update.updated_at);
            if let Some(name) = &changes.name {
                query.push(", name = ").push_bind(name.clone());
            }
            if let Some(email) = &changes.email {
                query.push(", email = ").push_bind(email.clone());
            }
            if let Some(phone) = &changes.phone {
                query.push(", phone = ").push_bind(phone.clone());
            }
            if let Some(business_name) = &changes.business_name {
                query.push(", business_name = ").push_bind(business_name.clone());
            }
            if let Some(message) = &changes.message {
                query.push(", message = ").push_bind(message.clone());
            }
            if let Some(file_path) = &update.file_path {
                query.push(", file_path = ").push_bind(file_path.clone());
            }
            query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

            let row = query
                .build_query_as::<LeadRow>()
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn delete_lead(&self, id: i64) -> MetadataResult<bool> {
            let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn list_leads(&self, offset: u64, limit: u32) -> MetadataResult<Vec<LeadRow>> {
            let rows = sqlx::query_as::<_, LeadRow>(
                "SELECT * FROM contacts ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            )
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn count_leads(&self) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
                .fetch_one(&self.pool)
                .await?;
            Ok(count.max(0) as u64)
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    business_name TEXT,
    message TEXT NOT NULL,
    file_path TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_created ON contacts(created_at DESC, id DESC);
"#;
