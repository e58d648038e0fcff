//! Hand-written fakes for the engine's storage and mail ports.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use daminform_core::{
    AssetStore, AuditSink, DamError, DispatchState, Mailer, OutboundMessage,
    QueueStore, RelationshipStore, Result,
};
use daminform_model::{
    AssetKey, NewNotification, ParentLink, PendingNotification, Severity,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Audit sink that drops everything.
pub struct NullAudit;

#[async_trait]
impl AuditSink for NullAudit {
    async fn record(&self, _: &str, _: &str, _: Severity) {}
}

/// In-memory dispatch cursor.
pub struct FakeState {
    cursor: Mutex<Option<i64>>,
}

impl FakeState {
    pub fn new(cursor: Option<i64>) -> Self {
        Self { cursor: Mutex::new(cursor) }
    }

    pub fn cursor(&self) -> Option<i64> {
        *self.cursor.lock().unwrap()
    }
}

#[async_trait]
impl DispatchState for FakeState {
    async fn last_dispatched(&self) -> Result<Option<i64>> {
        Ok(self.cursor())
    }

    async fn set_last_dispatched(&self, id: i64) -> Result<()> {
        *self.cursor.lock().unwrap() = Some(id);
        Ok(())
    }
}

/// In-memory asset index.
pub struct FakeAssets {
    index: HashMap<AssetKey, String>,
    activities: Mutex<Vec<AssetKey>>,
}

impl FakeAssets {
    pub fn new() -> Self {
        Self { index: HashMap::new(), activities: Mutex::new(Vec::new()) }
    }

    pub fn with_asset(mut self, ticket: &str, filename: &str) -> Self {
        let key = AssetKey::new(ticket, filename);
        let path = format!("/dam/{ticket}/{filename}");
        self.index.insert(key, path);
        self
    }

    pub fn activities(&self) -> Vec<AssetKey> {
        self.activities.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn load_index(&self) -> Result<HashMap<AssetKey, String>> {
        Ok(self.index.clone())
    }

    async fn insert_activity(&self, key: &AssetKey) -> Result<()> {
        self.activities.lock().unwrap().push(key.clone());
        Ok(())
    }
}

/// In-memory notification queue.
pub struct FakeQueue {
    entries: Vec<PendingNotification>,
    appended: Mutex<Vec<NewNotification>>,
}

impl FakeQueue {
    pub fn new(entries: Vec<PendingNotification>) -> Self {
        Self { entries, appended: Mutex::new(Vec::new()) }
    }

    pub fn appended(&self) -> Vec<NewNotification> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueStore for FakeQueue {
    async fn entries_after(
        &self,
        cursor: i64,
    ) -> Result<Vec<PendingNotification>> {
        let mut pending: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.id > cursor)
            .cloned()
            .collect();
        pending.sort_by_key(|e| e.id);
        Ok(pending)
    }

    async fn append(&self, entry: NewNotification) -> Result<()> {
        self.appended.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Mailer that records messages and can be told to reject one recipient.
pub struct FakeMailer {
    sent: Mutex<Vec<OutboundMessage>>,
    fail_to: Option<String>,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail_to: None }
    }

    pub fn failing_for(address: impl Into<String>) -> Self {
        Self { sent: Mutex::new(Vec::new()), fail_to: Some(address.into()) }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        if self.fail_to.as_deref() == Some(message.to.as_str()) {
            return Err(DamError::Send(format!(
                "relay rejected {}",
                message.to
            )));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn queue_entry(
    id: i64,
    lead: &str,
    ticket: &str,
    notify_manager: bool,
) -> PendingNotification {
    PendingNotification {
        id,
        lead: lead.to_string(),
        message: format!("<p>work pending on entry {id}</p>"),
        asset: format!("asset-{id}"),
        ticket: ticket.to_string(),
        created: Utc::now(),
        notify_manager,
    }
}

/// In-memory relationship graph.
pub struct FakeGraph {
    names: HashMap<i64, String>,
    parents: HashMap<i64, Vec<ParentLink>>,
    failing: bool,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            parents: HashMap::new(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self { failing: true, ..Self::new() }
    }

    pub fn with_asset(mut self, id: i64, name: &str) -> Self {
        self.names.insert(id, name.to_string());
        self
    }

    /// Add a parent edge; the parent must already be known via
    /// `with_asset` so the link carries its display name.
    pub fn with_edge(
        mut self,
        child: i64,
        parent: i64,
        released: bool,
    ) -> Self {
        let name = self.names.get(&parent).cloned().unwrap_or_default();
        self.parents.entry(child).or_default().push(ParentLink {
            name,
            asset_id: parent,
            xref_id: format!("X-{parent}"),
            released,
        });
        self
    }
}

#[async_trait]
impl RelationshipStore for FakeGraph {
    async fn display_name(&self, asset_id: i64) -> Result<Option<String>> {
        if self.failing {
            return Err(DamError::Query("graph store offline".to_string()));
        }
        Ok(self.names.get(&asset_id).cloned())
    }

    async fn parents_of(&self, asset_id: i64) -> Result<Vec<ParentLink>> {
        if self.failing {
            return Err(DamError::Query("graph store offline".to_string()));
        }
        Ok(self.parents.get(&asset_id).cloned().unwrap_or_default())
    }
}
