//! Core data model definitions shared across DAMInform crates.

pub mod anomaly;
pub mod keys;
pub mod locks;
pub mod log;
pub mod queue;
pub mod relationship;
pub mod severity;

pub use anomaly::{AnomalyKind, AnomalyReport};
pub use keys::AssetKey;
pub use locks::ReleaseStatus;
pub use log::LogRecord;
pub use queue::{NewNotification, PendingNotification};
pub use relationship::{
    ParentLink, RELEASED_MARKER, UsageBucket, UsageEntry, UsageSection,
    WhereUsedReport,
};
pub use severity::Severity;
