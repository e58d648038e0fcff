use crate::audit::AuditSink;
use crate::database::postgres::PostgresDatabase;
use crate::error::{DamError, Result};
use daminform_model::{ReleaseStatus, Severity};
use std::sync::Arc;
use tracing::{debug, error};

/// Table name recorded on lock rows; locks are scoped per table so the
/// same identity can in principle be locked for different record kinds.
const ASSET_TABLE: &str = "asset";

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Advisory per-asset locking around external refresh operations.
///
/// The lock is the existence of a row: acquisition is made atomic by the
/// store's uniqueness constraint on (ticket, tablename, ident), not by any
/// application-level mutex. Nothing stops a collaborator that ignores the
/// lock table from mutating the asset directly, and there is no expiry; an
/// abandoned lock is cleared out-of-band.
pub struct LockManager {
    db: PostgresDatabase,
    audit: Arc<dyn AuditSink>,
}

impl LockManager {
    pub fn new(db: PostgresDatabase, audit: Arc<dyn AuditSink>) -> Self {
        Self { db, audit }
    }

    /// Take the refresh lock for an asset. Fails with
    /// [`DamError::LockWrite`] when the identity already holds a lock
    /// (uniqueness violation); there is no blocking or waiting.
    pub async fn acquire_refresh_lock(
        &self,
        ticket: &str,
        ident: &str,
        label: &str,
    ) -> Result<()> {
        debug!("acquiring refresh lock for {ident} ({ticket})");

        let result = sqlx::query(
            r#"
            INSERT INTO public."lock" (ticket, tablename, ident)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(ticket)
        .bind(ASSET_TABLE)
        .bind(ident)
        .execute(self.db.pool())
        .await;

        if let Err(e) = result {
            let err = acquire_failure(ident, &e);
            self.audit
                .record(
                    &format!("Problems locking {label} [{ident}] : {err}"),
                    ticket,
                    Severity::Error,
                )
                .await;
            return Err(err);
        }

        self.audit
            .record(
                &format!("Locked {label} [{ident}] for refresh"),
                ticket,
                Severity::Info,
            )
            .await;
        Ok(())
    }

    /// Release the refresh lock for an asset: reset the asset's staleness
    /// flags (modified off, is-latest on, matched case-insensitively) and
    /// delete the lock row. Both mutations commit in one transaction, so a
    /// failure leaves neither applied; audit entries are written only
    /// after commit.
    pub async fn release_refresh_lock(
        &self,
        ticket: &str,
        ident: &str,
        label: &str,
    ) -> Result<ReleaseStatus> {
        debug!("releasing refresh lock for {ident} ({ticket})");

        let status = match self.release_in_tx(ticket, ident).await {
            Ok(status) => status,
            Err(e) => {
                error!("release of {ident} failed: {e}");
                self.audit
                    .record(
                        &format!(
                            "Problems unlocking {label} [{ident}] : {e}"
                        ),
                        ticket,
                        Severity::Error,
                    )
                    .await;
                return Err(DamError::LockWrite(e.to_string()));
            }
        };

        self.audit
            .record(
                &format!(
                    "Reset modified/is-latest for {label} [{ident}] (matched: {})",
                    status.state_cleared
                ),
                ticket,
                Severity::Info,
            )
            .await;
        self.audit
            .record(
                &format!(
                    "Unlocked {label} [{ident}] (held: {})",
                    status.lock_released
                ),
                ticket,
                Severity::Info,
            )
            .await;

        Ok(status)
    }

    async fn release_in_tx(
        &self,
        ticket: &str,
        ident: &str,
    ) -> std::result::Result<ReleaseStatus, sqlx::Error> {
        let mut tx = self.db.pool().begin().await?;

        let cleared = sqlx::query(
            r#"
            UPDATE public.asset
            SET modified = FALSE, islatest = TRUE
            WHERE LOWER(filename) = LOWER($1) AND LOWER(ticket) = LOWER($2)
            "#,
        )
        .bind(ident)
        .bind(ticket)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM public."lock"
            WHERE ticket = $1 AND tablename = $2 AND ident = $3
            "#,
        )
        .bind(ticket)
        .bind(ASSET_TABLE)
        .bind(ident)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReleaseStatus {
            state_cleared: cleared.rows_affected() > 0,
            lock_released: deleted.rows_affected() > 0,
        })
    }
}

/// Map an acquire failure into the lock-write error kind. A uniqueness
/// violation means the identity already holds a lock; the protocol has no
/// blocking, so that surfaces as a plain failure to the caller.
fn acquire_failure(ident: &str, err: &sqlx::Error) -> DamError {
    if is_unique_violation(err) {
        DamError::LockWrite(format!("lock already held for {ident}"))
    } else {
        DamError::LockWrite(err.to_string())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    struct StubDbError {
        code: &'static str,
    }

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database error {}", self.code)
        }
    }

    impl std::error::Error for StubDbError {}

    impl sqlx::error::DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "stub database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(
            &mut self,
        ) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(
            self: Box<Self>,
        ) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(StubDbError { code }))
    }

    #[test]
    fn test_duplicate_acquire_maps_to_lock_write() {
        let err = acquire_failure("sepsis panel.oet", &db_error("23505"));
        match err {
            DamError::LockWrite(detail) => {
                assert!(detail.contains("already held"));
                assert!(detail.contains("sepsis panel.oet"));
            }
            other => panic!("expected LockWrite, got {other:?}"),
        }
    }

    #[test]
    fn test_other_write_failures_keep_their_detail() {
        let err = acquire_failure("a.oet", &db_error("42P01"));
        match err {
            DamError::LockWrite(detail) => {
                assert!(!detail.contains("already held"));
            }
            other => panic!("expected LockWrite, got {other:?}"),
        }
    }

    #[test]
    fn test_is_unique_violation_checks_the_code() {
        assert!(is_unique_violation(&db_error("23505")));
        assert!(!is_unique_violation(&db_error("23503")));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
