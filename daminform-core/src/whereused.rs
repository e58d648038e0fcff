use crate::audit::AuditSink;
use crate::database::ports::RelationshipStore;
use crate::error::Result;
use daminform_model::{
    ParentLink, Severity, UsageBucket, UsageEntry, UsageSection,
    WhereUsedReport,
};
use std::sync::Arc;
use tracing::debug;

/// Report depth: direct parents plus their own parents. The traversal is
/// a fixed-depth walk, not a transitive closure; containers three or more
/// hops from the target are invisible.
pub const DEFAULT_MAX_DEPTH: u8 = 2;

/// Read-only walker over the asset relationship graph.
pub struct RelationshipWalker {
    store: Arc<dyn RelationshipStore>,
    audit: Arc<dyn AuditSink>,
}

impl RelationshipWalker {
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self { store, audit }
    }

    /// Direct parents of an asset, sorted descending by display name so
    /// reports render deterministically. No parents is an empty set, not
    /// an error.
    pub async fn parents(&self, asset_id: i64) -> Result<Vec<ParentLink>> {
        let mut links = self.store.parents_of(asset_id).await?;
        links.sort_by(|a, b| b.display_name().cmp(&a.display_name()));
        Ok(links)
    }

    /// Build the where-used report for an asset: classify each direct
    /// parent into a bucket (first keyword match wins), then expand one
    /// further hop for display. `max_depth` bounds the expansion; levels
    /// past `DEFAULT_MAX_DEPTH` are never fetched. Any query failure
    /// aborts the whole report.
    pub async fn where_used(
        &self,
        asset_id: i64,
        max_depth: u8,
    ) -> Result<WhereUsedReport> {
        let target_name = self
            .store
            .display_name(asset_id)
            .await?
            .unwrap_or_else(|| format!("asset {asset_id}"));

        let parents = self.parents(asset_id).await?;
        debug!("{} direct parents for {target_name}", parents.len());

        let mut members: [Vec<UsageEntry>; 4] = Default::default();

        for parent in parents {
            let slot = match UsageBucket::classify(&parent.name) {
                UsageBucket::OrderPanel => 0,
                UsageBucket::SmartGroup => 1,
                UsageBucket::OrderSet => 2,
                UsageBucket::Other => 3,
            };
            let grandparents = if max_depth > 1 {
                self.parents(parent.asset_id).await?
            } else {
                Vec::new()
            };
            members[slot].push(UsageEntry { parent, grandparents });
        }

        let sections = UsageBucket::ALL
            .iter()
            .zip(members)
            .map(|(bucket, members)| UsageSection { bucket: *bucket, members })
            .collect();

        self.audit
            .record(
                &format!("Where-used report built for {target_name}"),
                "",
                Severity::Debug,
            )
            .await;

        Ok(WhereUsedReport { target_name, sections })
    }
}
