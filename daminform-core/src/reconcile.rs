use crate::audit::AuditSink;
use crate::database::ports::{AssetStore, QueueStore};
use crate::error::{DamError, Result};
use daminform_model::{
    AnomalyKind, AnomalyReport, AssetKey, NewNotification, Severity,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Synthetic recipient for integrity alerts; the mail domain suffix is
/// applied at dispatch like any other lead.
const INTEGRITY_LEAD: &str = "dam-integrity";

/// Walks an asset tree, yielding (ticket, filename) keys for recognized
/// asset files. Directory layout is `<base>/<ticket>/.../<file>`; files
/// directly under the base have no ticket and are ignored.
#[derive(Debug, Clone)]
pub struct AssetScanner {
    /// Recognized asset extension, without the dot, compared
    /// case-insensitively.
    extension: String,
    /// Any directory with exactly this name is skipped, subtree included.
    skip_subdir: String,
}

impl AssetScanner {
    pub fn new(
        extension: impl Into<String>,
        skip_subdir: impl Into<String>,
    ) -> Self {
        Self {
            extension: extension.into().to_lowercase(),
            skip_subdir: skip_subdir.into(),
        }
    }

    pub fn is_asset_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_lowercase() == self.extension)
    }

    /// Walk `base` (or one ticket's subtree) and return the keys of every
    /// asset file found. The walk visits each non-skipped file exactly
    /// once; any traversal error aborts the scan.
    pub fn scan(
        &self,
        base: &Path,
        scope_ticket: Option<&str>,
    ) -> Result<Vec<AssetKey>> {
        let root = match scope_ticket {
            Some(ticket) => base.join(ticket),
            None => base.to_path_buf(),
        };

        debug!("scanning {} for .{} files", root.display(), self.extension);

        let mut found = Vec::new();
        let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
            !(entry.file_type().is_dir()
                && entry.file_name().to_str() == Some(&self.skip_subdir))
        });

        for entry in walker {
            let entry = entry.map_err(|e| DamError::Walk(e.to_string()))?;
            if entry.file_type().is_dir() || !self.is_asset_file(entry.path())
            {
                continue;
            }
            match self.key_for(base, entry.path()) {
                Some(key) => found.push(key),
                None => {
                    debug!(
                        "ignoring asset file outside a ticket folder: {}",
                        entry.path().display()
                    );
                }
            }
        }

        Ok(found)
    }

    /// Derive the (ticket, filename) key from a path relative to the scan
    /// base: the ticket is the first path component under the base.
    fn key_for(&self, base: &Path, path: &Path) -> Option<AssetKey> {
        let relative = path.strip_prefix(base).ok()?;
        let mut components = relative.components();
        let ticket = components.next()?.as_os_str().to_str()?;
        // A file directly under the base is its own first component.
        components.next()?;
        let filename = path.file_name()?.to_str()?;
        Some(AssetKey::new(ticket, filename))
    }
}

/// One-pass symmetric difference between the asset index and the set of
/// keys found on disk. The index doubles as the seen-set: keys found on
/// disk are removed as accounted for, disk keys with no index entry are
/// `MissingInIndex`, and whatever is left in the index afterwards is
/// `MissingOnDisk`. Order of discovery does not matter.
pub fn diff_against_index(
    index: &mut HashMap<AssetKey, String>,
    on_disk: &[AssetKey],
) -> AnomalyReport {
    let mut report = AnomalyReport::new();

    for key in on_disk {
        if index.remove(key).is_none() {
            report.insert(key.clone(), AnomalyKind::MissingInIndex);
        }
    }
    for key in index.keys() {
        report.insert(key.clone(), AnomalyKind::MissingOnDisk);
    }

    report
}

/// Diffs the asset store against filesystem state and issues corrective
/// records or an alert. The index is exhaustively loaded before the walk
/// starts; concurrent asset ingestion during a scan can produce false
/// anomalies, so callers schedule runs accordingly.
pub struct Reconciler {
    assets: Arc<dyn AssetStore>,
    queue: Arc<dyn QueueStore>,
    audit: Arc<dyn AuditSink>,
    scanner: AssetScanner,
}

impl Reconciler {
    pub fn new(
        assets: Arc<dyn AssetStore>,
        queue: Arc<dyn QueueStore>,
        audit: Arc<dyn AuditSink>,
        scanner: AssetScanner,
    ) -> Self {
        Self { assets, queue, audit, scanner }
    }

    /// Load the index and diff it against `base`, optionally narrowed to
    /// one ticket's subtree (in which case the index is narrowed to the
    /// same ticket, so other tickets' assets cannot show up as missing).
    pub async fn scan_and_diff(
        &self,
        base: &Path,
        scope_ticket: Option<&str>,
    ) -> Result<AnomalyReport> {
        let mut index = self.assets.load_index().await?;
        if let Some(ticket) = scope_ticket {
            let ticket = ticket.to_lowercase();
            index.retain(|key, _| key.ticket() == ticket);
        }

        let on_disk = self.scanner.scan(base, scope_ticket)?;
        Ok(diff_against_index(&mut index, &on_disk))
    }

    /// Full-tree integrity check. A non-empty anomaly set appends exactly
    /// one manager-flagged notification naming the scanned path — one
    /// alert per run, not one per anomaly.
    pub async fn check(&self, base: &Path) -> Result<AnomalyReport> {
        info!("integrity check under {}", base.display());
        self.audit
            .record(
                &format!("Integrity check started for {}", base.display()),
                "",
                Severity::Info,
            )
            .await;

        let report = match self.scan_and_diff(base, None).await {
            Ok(report) => report,
            Err(e) => {
                self.audit
                    .record(
                        &format!("Integrity check failed: {e}"),
                        "",
                        Severity::Error,
                    )
                    .await;
                return Err(e);
            }
        };

        if !report.is_empty() {
            warn!("integrity check found {} anomalies", report.len());
            self.queue
                .append(NewNotification {
                    lead: INTEGRITY_LEAD.to_string(),
                    message: format!(
                        "Integrity check found {} anomalies under {}",
                        report.len(),
                        base.display()
                    ),
                    asset: String::new(),
                    ticket: String::new(),
                    notify_manager: true,
                })
                .await?;
        }

        self.audit
            .record(
                &format!(
                    "Integrity check finished: {} anomalies",
                    report.len()
                ),
                "",
                Severity::Info,
            )
            .await;

        Ok(report)
    }

    /// Scoped reconciliation for one ticket. Files present on disk but
    /// absent from the index get a synthetic MODIFY activity record so the
    /// external ingester picks them up; index rows with no file behind
    /// them are reported but deliberately left uncorrected.
    pub async fn fix(
        &self,
        base: &Path,
        ticket: &str,
    ) -> Result<AnomalyReport> {
        info!("fix run for ticket {ticket} under {}", base.display());

        let report = self.scan_and_diff(base, Some(ticket)).await?;

        for (key, kind) in &report {
            match kind {
                AnomalyKind::MissingInIndex => {
                    self.assets.insert_activity(key).await?;
                    self.audit
                        .record(
                            &format!(
                                "Queued ingest activity for unindexed file {key}"
                            ),
                            ticket,
                            Severity::Info,
                        )
                        .await;
                }
                AnomalyKind::MissingOnDisk => {
                    self.audit
                        .record(
                            &format!("Asset {key} has no file on disk"),
                            ticket,
                            Severity::Warning,
                        )
                        .await;
                }
            }
        }

        Ok(report)
    }
}
