//! PostgreSQL-based lead store.

use crate::error::MetadataResult;
use crate::models::{LeadRow, LeadUpdate, NewLeadRow};
use crate::repos::LeadRepo;
use crate::store::MetadataStore;
use async_trait::async_trait;
use leadline_core::config::PgSslMode;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode as SqlxPgSslMode};
use sqlx::{Pool, Postgres, QueryBuilder};
use std::str::FromStr;

const POSTGRES_SCHEMA: &str = include_str!("postgres_schema.sql");

/// Split the embedded schema into executable statements, dropping
/// comment-only fragments.
fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .map(str::trim)
        .filter(|statement| {
            statement
                .lines()
                .map(str::trim)
                .any(|line| !line.is_empty() && !line.starts_with("--"))
        })
        .collect()
}

/// PostgreSQL-based lead store.
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    /// Connect using a full connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        tracing::info!("Connecting to PostgreSQL using connection URL");
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Connect using individual parameters, so the password can come from
    /// its own environment variable.
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }
        if let Some(pass) = password {
            opts = opts.password(pass);
        }
        if let Some(mode) = ssl_mode {
            opts = opts.ssl_mode(match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            });
        }

        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL with individual parameters"
        );

        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> MetadataResult<Self> {
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{timeout_ms}ms"))]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for PostgresStore {
    async fn migrate(&self) -> MetadataResult<()> {
        // Prepared statements hold one statement each.
        for statement in schema_statements(POSTGRES_SCHEMA) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LeadRepo for PostgresStore {
    async fn create_lead(&self, lead: &NewLeadRow) -> MetadataResult<LeadRow> {
        let row = sqlx::query_as::<_, LeadRow>(
            r#"
            INSERT INTO contacts (name, email, phone, business_name, message, file_path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
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
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_lead(&self, id: i64) -> MetadataResult<Option<LeadRow>> {
        let row = sqlx::query_as::<_, LeadRow>("SELECT * FROM contacts WHERE id = $1")
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
        let mut query = QueryBuilder::<Postgres>::new("UPDATE contacts SET updated_at = ");
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
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_leads(&self, offset: u64, limit: u32) -> MetadataResult<Vec<LeadRow>> {
        let rows = sqlx::query_as::<_, LeadRow>(
            "SELECT * FROM contacts ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statements_skip_comment_only_fragments() {
        let schema = r#"
            -- comment only

            CREATE TABLE foo (id int);
            ;
            -- another comment
            CREATE TABLE bar (id int);
        "#;

        let statements = schema_statements(schema);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE foo"));
        assert!(statements[1].contains("CREATE TABLE bar"));
    }

    #[test]
    fn embedded_schema_creates_contacts() {
        let statements = schema_statements(POSTGRES_SCHEMA);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE TABLE IF NOT EXISTS contacts"));
        assert!(statements[1].contains("idx_contacts_created"));
    }
}
