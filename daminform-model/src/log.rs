use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One durable audit record, as read back for the log report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub when: DateTime<Utc>,
    /// Component string of the writer, e.g. `daminform v0.1.0`.
    pub component: String,
    /// Change ticket the entry concerns, empty when not ticket-scoped.
    pub ticket: String,
    pub severity: Severity,
}
