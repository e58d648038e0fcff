//! DAMInform server: HTTP triggers for the asset state and notification
//! engine, plus the dashboard report pages.

mod config;
mod reports;
mod routes;

use crate::config::Config;
use crate::routes::AppState;
use daminform_core::{AuditSink, Mailer, PgAuditSink, PostgresDatabase, SmtpMailer};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "daminform=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = PostgresDatabase::connect(&config.database_url).await?;
    db.ping().await?;
    info!("DAMInform v{} connected to database", env!("CARGO_PKG_VERSION"));

    let audit: Arc<dyn AuditSink> =
        Arc::new(PgAuditSink::new(db.pool().clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(
        &config.smtp_host,
        config.smtp_port,
        &config.smtp_username,
        config.smtp_password.as_deref(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let state = Arc::new(AppState {
        db,
        audit,
        mailer,
        config,
        dispatch_guard: tokio::sync::Mutex::new(()),
    });

    let app = routes::router(state);

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
