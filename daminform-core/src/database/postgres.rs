use crate::database::ports::{
    AssetStore, DispatchState, QueueStore, RelationshipStore,
};
use crate::error::{DamError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daminform_model::{
    AssetKey, LogRecord, NewNotification, ParentLink, PendingNotification,
    Severity,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::collections::HashMap;
use tracing::{debug, info};

/// Pool wrapper over the DAM Postgres schema. Implements the engine's
/// storage ports and the direct queries used by the lock manager and
/// reconciler.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct QueueRow {
    id: i64,
    lead: String,
    message: String,
    asset: String,
    jirakey: String,
    created: DateTime<Utc>,
    notifymgr: bool,
}

impl From<QueueRow> for PendingNotification {
    fn from(row: QueueRow) -> Self {
        PendingNotification {
            id: row.id,
            lead: row.lead,
            message: row.message,
            asset: row.asset,
            ticket: row.jirakey,
            created: row.created,
            notify_manager: row.notifymgr,
        }
    }
}

impl PostgresDatabase {
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL database");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(url)
            .await
            .map_err(|e| {
                DamError::Query(format!("failed to connect to PostgreSQL: {e}"))
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DamError::Query(format!("ping failed: {e}")))
    }

    /// Full queue contents, newest first, for the notifications report.
    pub async fn notification_rows(&self) -> Result<Vec<PendingNotification>> {
        let rows = sqlx::query_as::<_, QueueRow>(
            r#"
            SELECT id, "lead", message, asset, jirakey, created, notifymgr
            FROM public.notificationqueue
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DamError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Audit log contents, newest first, for the log report.
    pub async fn log_rows(&self) -> Result<Vec<LogRecord>> {
        let rows =
            sqlx::query_as::<_, (String, DateTime<Utc>, String, String, String)>(
                r#"
                SELECT message, messagetime, fromcomponent, focusticket, logtype
                FROM public.log
                ORDER BY messagetime DESC
                "#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DamError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(message, when, component, ticket, logtype)| LogRecord {
                message,
                when,
                component,
                ticket,
                severity: logtype.parse().unwrap_or(Severity::Info),
            })
            .collect())
    }
}

#[async_trait]
impl AssetStore for PostgresDatabase {
    async fn load_index(&self) -> Result<HashMap<AssetKey, String>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            "SELECT ticket, filename, fullpath FROM public.asset",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DamError::IndexLoad(e.to_string()))?;

        debug!("loaded {} asset index rows", rows.len());

        Ok(rows
            .into_iter()
            .map(|(ticket, filename, fullpath)| {
                (AssetKey::new(ticket, filename), fullpath)
            })
            .collect())
    }

    /// The epoch timestamp marks the row as reconciler-generated rather
    /// than user activity.
    async fn insert_activity(&self, key: &AssetKey) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO public.activity (ticket, filename, operation, happened)
            VALUES ($1, $2, 'MODIFY', $3)
            "#,
        )
        .bind(key.ticket())
        .bind(key.filename())
        .bind(DateTime::<Utc>::UNIX_EPOCH)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| DamError::ActivityWrite(e.to_string()))
    }
}

#[async_trait]
impl QueueStore for PostgresDatabase {
    async fn entries_after(
        &self,
        cursor: i64,
    ) -> Result<Vec<PendingNotification>> {
        let rows = sqlx::query_as::<_, QueueRow>(
            r#"
            SELECT id, "lead", message, asset, jirakey, created, notifymgr
            FROM public.notificationqueue
            WHERE id > $1
            ORDER BY id ASC
            "#,
        )
        .bind(cursor)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DamError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn append(&self, entry: NewNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO public.notificationqueue
                ("lead", message, asset, jirakey, created, notifymgr)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.lead)
        .bind(&entry.message)
        .bind(&entry.asset)
        .bind(&entry.ticket)
        .bind(Utc::now())
        .bind(entry.notify_manager)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| DamError::QueueWrite(e.to_string()))
    }
}

#[async_trait]
impl DispatchState for PostgresDatabase {
    async fn last_dispatched(&self) -> Result<Option<i64>> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT lastnotification FROM public.state",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DamError::StateRead(e.to_string()))?;

        Ok(row.map(|(id,)| id))
    }

    async fn set_last_dispatched(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE public.state SET lastnotification = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| DamError::StateRead(e.to_string()))
    }
}

#[async_trait]
impl RelationshipStore for PostgresDatabase {
    async fn display_name(&self, asset_id: i64) -> Result<Option<String>> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT name FROM public.asset WHERE oid = $1 LIMIT 1",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DamError::Query(e.to_string()))?;

        Ok(row.map(|(name,)| name))
    }

    async fn parents_of(&self, asset_id: i64) -> Result<Vec<ParentLink>> {
        let rows = sqlx::query_as::<_, (String, i64, String, bool)>(
            r#"
            SELECT DISTINCT a.name, a.oid, a.cid, r.released
            FROM public.relationship r
            JOIN public.asset a ON a.oid = r.parentoid
            WHERE r.childoid = $1
            "#,
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DamError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(name, oid, cid, released)| ParentLink {
                name,
                asset_id: oid,
                xref_id: cid,
                released,
            })
            .collect())
    }
}
