use serde::{Deserialize, Serialize};

/// Aggregate outcome of a refresh lock release. Both mutations commit
/// together; the flags report whether each statement matched a row, so a
/// release against an unheld lock is visible without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStatus {
    /// The asset row had its modified/is-latest flags reset.
    pub state_cleared: bool,
    /// A lock row existed and was deleted.
    pub lock_released: bool,
}

impl ReleaseStatus {
    pub fn is_complete(&self) -> bool {
        self.state_cleared && self.lock_released
    }
}
