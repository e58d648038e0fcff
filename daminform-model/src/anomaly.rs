use crate::keys::AssetKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One direction of filesystem/database drift for a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// The file exists on disk but the asset store has no record of it.
    MissingInIndex,
    /// The asset store has a record but no file exists on disk.
    MissingOnDisk,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::MissingInIndex => f.write_str("missing in index"),
            AnomalyKind::MissingOnDisk => f.write_str("missing on disk"),
        }
    }
}

/// Result of one reconciliation run. Ordered so report rendering and
/// assertions are deterministic; not persisted.
pub type AnomalyReport = BTreeMap<AssetKey, AnomalyKind>;
