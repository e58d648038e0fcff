use crate::error::Result;
use async_trait::async_trait;
use daminform_model::{
    AssetKey, NewNotification, ParentLink, PendingNotification,
};
use std::collections::HashMap;

/// Authoritative asset records, as the reconciler sees them.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// The full (ticket, filename) -> full-path index. Loaded exhaustively
    /// before any walk starts; the reconciler consumes it as a mutable
    /// seen-set.
    async fn load_index(&self) -> Result<HashMap<AssetKey, String>>;

    /// Record a synthetic MODIFY activity so the external ingester picks
    /// the file up on its next pass.
    async fn insert_activity(&self, key: &AssetKey) -> Result<()>;
}

/// Notification queue storage. Entries are append-only; the dispatcher
/// reads strictly above its cursor.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// All entries with id strictly greater than `cursor`, ascending by id.
    async fn entries_after(
        &self,
        cursor: i64,
    ) -> Result<Vec<PendingNotification>>;

    async fn append(&self, entry: NewNotification) -> Result<()>;
}

/// The single persisted dispatch cursor ("last dispatched id").
///
/// `last_dispatched` distinguishes an unreadable store (error) from an
/// absent row (`None`); the dispatcher sends nothing when the row is
/// absent rather than assuming a default.
#[async_trait]
pub trait DispatchState: Send + Sync {
    async fn last_dispatched(&self) -> Result<Option<i64>>;

    async fn set_last_dispatched(&self, id: i64) -> Result<()>;
}

/// Read-only access to the asset relationship graph.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Display name of an asset, `None` when the id is unknown.
    async fn display_name(&self, asset_id: i64) -> Result<Option<String>>;

    /// Distinct direct parent relationships of an asset. No ordering is
    /// guaranteed here; the walker sorts for report determinism.
    async fn parents_of(&self, asset_id: i64) -> Result<Vec<ParentLink>>;
}
