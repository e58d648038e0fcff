//! Dashboard report plumbing: the notification queue and the audit log
//! rendered as plain HTML tables. String templating only, by design.

use crate::routes::{AppState, internal};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
};
use daminform_model::{LogRecord, PendingNotification};
use std::sync::Arc;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><title>DAMInform</title></head>
<body>
<table>
<cdata>%%TABLE%%</cdata>
</table>
</body>
</html>
"#;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub async fn notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let rows = state.db.notification_rows().await.map_err(internal)?;
    Ok(Html(render_page(&notifications_table(&rows))))
}

pub async fn log(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, StatusCode> {
    let rows = state.db.log_rows().await.map_err(internal)?;
    Ok(Html(render_page(&log_table(&rows))))
}

fn render_page(table: &str) -> String {
    PAGE_TEMPLATE.replace("<cdata>%%TABLE%%</cdata>", table)
}

fn notifications_table(rows: &[PendingNotification]) -> String {
    let mut out = String::from(
        "<h1>Notifications report</h1>\
         <thead><tr><th>id</th><th>message</th><th>ticket</th>\
         <th>asset</th><th>created</th><th>notify manager</th></tr></thead>\
         <tbody>",
    );
    for row in rows {
        out.push_str(&format!(
            "<tr><th class='row-header'>{}</th><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td></tr>",
            row.id,
            row.message,
            row.ticket,
            row.asset,
            row.created.format(TIME_FORMAT),
            row.notify_manager,
        ));
    }
    out.push_str("</tbody>");
    out
}

fn log_table(rows: &[LogRecord]) -> String {
    let mut out = String::from(
        "<h1>Log report</h1>\
         <thead><tr><th>message</th><th>ticket</th><th>component</th>\
         <th>time</th><th>severity</th></tr></thead>\
         <tbody>",
    );
    for row in rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.message,
            row.ticket,
            row.component,
            row.when.format(TIME_FORMAT),
            row.severity,
        ));
    }
    out.push_str("</tbody>");
    out
}
