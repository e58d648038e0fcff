use async_trait::async_trait;
use chrono::Utc;
use daminform_model::Severity;
use sqlx::PgPool;
use tracing::warn;

/// Durable audit log. Every engine component writes through this; nothing
/// in the engine reads it back (the log report is an HTTP-layer concern).
///
/// The sink is write-only and must never take down the operation that is
/// logging, so `record` is infallible from the caller's point of view;
/// implementations deal with their own failures.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, message: &str, ticket: &str, severity: Severity);
}

/// Component string stamped on every audit row written by this build.
const COMPONENT: &str = concat!("daminform v", env!("CARGO_PKG_VERSION"));

/// Audit sink backed by the `public.log` table.
#[derive(Debug, Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn record(&self, message: &str, ticket: &str, severity: Severity) {
        let result = sqlx::query(
            r#"
            INSERT INTO public.log
                (message, messagetime, fromcomponent, focusticket, logtype)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message)
        .bind(Utc::now())
        .bind(COMPONENT)
        .bind(ticket)
        .bind(severity.as_str())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!("audit write failed ({severity}): {message}: {e}");
        }
    }
}
