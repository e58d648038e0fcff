use crate::config::Config;
use crate::reports;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use daminform_core::{
    AssetScanner, AuditSink, DamError, DispatchOptions, Dispatcher,
    LockManager, Mailer, PostgresDatabase, Reconciler, RelationshipWalker,
    whereused::DEFAULT_MAX_DEPTH,
};
use daminform_model::{AnomalyReport, ReleaseStatus, WhereUsedReport};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

pub struct AppState {
    pub db: PostgresDatabase,
    pub audit: Arc<dyn AuditSink>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
    /// Serializes dispatch runs: the engine requires at most one active
    /// dispatcher process-wide and provides no internal mutex.
    pub dispatch_guard: tokio::sync::Mutex<()>,
}

impl AppState {
    fn lock_manager(&self) -> LockManager {
        LockManager::new(self.db.clone(), self.audit.clone())
    }

    fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            Arc::new(self.db.clone()),
            Arc::new(self.db.clone()),
            self.audit.clone(),
            AssetScanner::new(
                &self.config.asset_extension,
                &self.config.skip_subdir,
            ),
        )
    }

    fn walker(&self) -> RelationshipWalker {
        RelationshipWalker::new(Arc::new(self.db.clone()), self.audit.clone())
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            Arc::new(self.db.clone()),
            Arc::new(self.db.clone()),
            self.mailer.clone(),
            self.audit.clone(),
            DispatchOptions {
                from: self.config.mail_from.clone(),
                domain: self.config.mail_domain.clone(),
                subject_prefix: self.config.subject_prefix.clone(),
                manager_addresses: self.config.manager_addresses.clone(),
            },
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/refresh/start", post(refresh_start))
        .route("/api/refresh/end", post(refresh_end))
        .route("/api/integrity/check", post(integrity_check))
        .route("/api/integrity/fix/{ticket}", post(integrity_fix))
        .route("/api/where-used/{asset_id}", get(where_used))
        .route("/api/dispatch", post(dispatch))
        .route("/reports/notifications", get(reports::notifications))
        .route("/reports/log", get(reports::log))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP contract is binary: an operation succeeds or it does not.
/// Diagnostics live in the audit log, not in response bodies.
pub(crate) fn internal(e: DamError) -> StatusCode {
    error!("request failed: {e}");
    StatusCode::INTERNAL_SERVER_ERROR
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    ticket: String,
    asset: String,
    label: String,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn refresh_start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<StatusCode, StatusCode> {
    state
        .lock_manager()
        .acquire_refresh_lock(&req.ticket, &req.asset, &req.label)
        .await
        .map(|_| StatusCode::OK)
        .map_err(internal)
}

async fn refresh_end(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ReleaseStatus>, StatusCode> {
    state
        .lock_manager()
        .release_refresh_lock(&req.ticket, &req.asset, &req.label)
        .await
        .map(Json)
        .map_err(internal)
}

async fn integrity_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    let report = state
        .reconciler()
        .check(&state.config.working_folder)
        .await
        .map_err(internal)?;
    Ok(Json(anomaly_json(&report)))
}

async fn integrity_fix(
    State(state): State<Arc<AppState>>,
    Path(ticket): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let report = state
        .reconciler()
        .fix(&state.config.working_folder, &ticket)
        .await
        .map_err(internal)?;
    Ok(Json(anomaly_json(&report)))
}

async fn where_used(
    State(state): State<Arc<AppState>>,
    Path(asset_id): Path<i64>,
) -> Result<Json<WhereUsedReport>, StatusCode> {
    state
        .walker()
        .where_used(asset_id, DEFAULT_MAX_DEPTH)
        .await
        .map(Json)
        .map_err(internal)
}

async fn dispatch(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    let _guard = state.dispatch_guard.lock().await;
    let outcome = state.dispatcher().dispatch().await.map_err(internal)?;

    let body = json!({
        "scanned": outcome.scanned,
        "sent": outcome.sent,
        "failed": outcome.failed,
        "cursor": outcome.cursor,
    });
    if outcome.is_complete() {
        Ok(Json(body))
    } else {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

fn anomaly_json(report: &AnomalyReport) -> Value {
    json!({
        "count": report.len(),
        "anomalies": report
            .iter()
            .map(|(key, kind)| {
                json!({
                    "ticket": key.ticket(),
                    "filename": key.filename(),
                    "kind": kind.to_string(),
                })
            })
            .collect::<Vec<_>>(),
    })
}
