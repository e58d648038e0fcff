use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification queue row awaiting dispatch. Append-only; consumption is
/// implicit through the dispatch cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNotification {
    pub id: i64,
    /// Recipient identity; the mail domain suffix is applied at dispatch.
    pub lead: String,
    pub message: String,
    pub asset: String,
    /// Change ticket key the notification concerns.
    pub ticket: String,
    pub created: DateTime<Utc>,
    /// When set, the configured manager addresses are copied in.
    pub notify_manager: bool,
}

/// Append form of a queue entry; the id and creation time are assigned by
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub lead: String,
    pub message: String,
    pub asset: String,
    pub ticket: String,
    pub notify_manager: bool,
}
