//! Asset State & Notification Engine for DAMInform.
//!
//! The engine has four moving parts, all triggered one request at a time
//! from the HTTP layer:
//!
//! - [`locks::LockManager`] — advisory per-asset locking around external
//!   refresh operations
//! - [`reconcile::Reconciler`] — filesystem vs. asset-store drift detection
//!   and correction
//! - [`whereused::RelationshipWalker`] — bounded-depth where-used reports
//! - [`dispatch::Dispatcher`] — cursor-driven at-least-once notification
//!   delivery
//!
//! Storage and mail collaborators sit behind ports in [`database::ports`],
//! [`audit`] and [`mail`]; Postgres implementations live in
//! [`database::postgres`].

pub mod audit;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod locks;
pub mod mail;
pub mod reconcile;
pub mod whereused;

pub use audit::{AuditSink, PgAuditSink};
pub use database::ports::{
    AssetStore, DispatchState, QueueStore, RelationshipStore,
};
pub use database::postgres::PostgresDatabase;
pub use dispatch::{DispatchOptions, DispatchOutcome, Dispatcher};
pub use error::{DamError, Result};
pub use locks::LockManager;
pub use mail::{Mailer, OutboundMessage, SmtpMailer};
pub use reconcile::{AssetScanner, Reconciler, diff_against_index};
pub use whereused::{DEFAULT_MAX_DEPTH, RelationshipWalker};
