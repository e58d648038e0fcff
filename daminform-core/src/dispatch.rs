use crate::audit::AuditSink;
use crate::database::ports::{DispatchState, QueueStore};
use crate::error::Result;
use crate::mail::{Mailer, OutboundMessage};
use daminform_model::Severity;
use std::sync::Arc;
use tracing::{info, warn};

/// Addressing and composition settings for outbound notifications.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// From address on every notification.
    pub from: String,
    /// Domain appended to an entry's lead identity to form the recipient.
    pub domain: String,
    /// Prefix prepended to the ticket key in the subject line.
    pub subject_prefix: String,
    /// Addresses copied in when an entry is manager-flagged.
    pub manager_addresses: Vec<String>,
}

/// Result of one dispatch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Entries found above the cursor.
    pub scanned: usize,
    /// Entries successfully delivered this run.
    pub sent: usize,
    /// Id of the entry whose send failed, if the run stopped early.
    pub failed: Option<i64>,
    /// Cursor value after the run, when one was written.
    pub cursor: Option<i64>,
}

impl DispatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

/// Drains the notification queue strictly above the persisted cursor,
/// one email per entry, ascending by id.
///
/// Delivery is at-least-once: the cursor advances only past the last
/// successfully sent entry, so a failed entry stops the run and is
/// retried on the next one, and a crash after a send but before the
/// cursor write re-sends that entry. (The service this replaces advanced
/// the cursor past failed entries, silently dropping them; that was a
/// defect, not a policy, and is not preserved.)
///
/// The dispatcher owns no mutual exclusion: two concurrent runs would
/// read the same cursor and double-send. Callers must serialize dispatch
/// process-wide.
pub struct Dispatcher {
    state: Arc<dyn DispatchState>,
    queue: Arc<dyn QueueStore>,
    mailer: Arc<dyn Mailer>,
    audit: Arc<dyn AuditSink>,
    options: DispatchOptions,
}

impl Dispatcher {
    pub fn new(
        state: Arc<dyn DispatchState>,
        queue: Arc<dyn QueueStore>,
        mailer: Arc<dyn Mailer>,
        audit: Arc<dyn AuditSink>,
        options: DispatchOptions,
    ) -> Self {
        Self { state, queue, mailer, audit, options }
    }

    pub async fn dispatch(&self) -> Result<DispatchOutcome> {
        self.audit
            .record("Doing notification dispatch", "", Severity::Info)
            .await;

        let Some(cursor) = self.state.last_dispatched().await? else {
            // No state row: nothing has ever been dispatched and no
            // default is assumed.
            warn!("dispatch state row absent; not dispatching");
            return Ok(DispatchOutcome {
                scanned: 0,
                sent: 0,
                failed: None,
                cursor: None,
            });
        };

        let entries = self.queue.entries_after(cursor).await?;
        info!("{} notifications pending above cursor {cursor}", entries.len());

        let mut last_sent = None;
        let mut failed = None;
        let mut sent = 0usize;

        for entry in &entries {
            let to = format!("{}@{}", entry.lead, self.options.domain);
            let cc = if entry.notify_manager {
                self.options.manager_addresses.clone()
            } else {
                Vec::new()
            };
            let message = OutboundMessage {
                from: self.options.from.clone(),
                to: to.clone(),
                cc,
                subject: format!(
                    "{}{}",
                    self.options.subject_prefix, entry.ticket
                ),
                html_body: entry.message.clone(),
            };

            self.audit
                .record(
                    &format!(
                        "Sending notification about {} to {to}",
                        entry.ticket
                    ),
                    &entry.ticket,
                    Severity::Debug,
                )
                .await;

            match self.mailer.send(&message).await {
                Ok(()) => {
                    last_sent = Some(entry.id);
                    sent += 1;
                }
                Err(e) => {
                    self.audit
                        .record(
                            &format!(
                                "Problems sending mail notification [{}] : {e}",
                                entry.id
                            ),
                            &entry.ticket,
                            Severity::Error,
                        )
                        .await;
                    failed = Some(entry.id);
                    break;
                }
            }
        }

        if let Some(id) = last_sent {
            self.state.set_last_dispatched(id).await?;
        }

        Ok(DispatchOutcome {
            scanned: entries.len(),
            sent,
            failed,
            cursor: last_sent,
        })
    }
}
