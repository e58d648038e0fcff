use thiserror::Error;

/// Engine error kinds. Callers get the kind; detailed diagnostics are
/// written through the audit sink before an error is surfaced, so the
/// message here is best-effort context, not the contract.
#[derive(Error, Debug)]
pub enum DamError {
    #[error("lock write failed: {0}")]
    LockWrite(String),

    #[error("asset index load failed: {0}")]
    IndexLoad(String),

    #[error("filesystem walk failed: {0}")]
    Walk(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("dispatch state unreadable: {0}")]
    StateRead(String),

    #[error("mail send failed: {0}")]
    Send(String),

    #[error("queue write failed: {0}")]
    QueueWrite(String),

    #[error("activity write failed: {0}")]
    ActivityWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DamError>;
