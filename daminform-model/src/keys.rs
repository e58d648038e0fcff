use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an asset: the change ticket folder it lives under and its
/// filename. Both components are normalized to lowercase so that disk
/// casing and database casing compare equal, matching the case-insensitive
/// asset lookups used on lock release.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AssetKey {
    ticket: String,
    filename: String,
}

impl AssetKey {
    pub fn new(ticket: impl AsRef<str>, filename: impl AsRef<str>) -> Self {
        Self {
            ticket: ticket.as_ref().to_lowercase(),
            filename: filename.as_ref().to_lowercase(),
        }
    }

    pub fn ticket(&self) -> &str {
        &self.ticket
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ticket, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_case_insensitive() {
        let a = AssetKey::new("DAM-17", "Sepsis Panel.OET");
        let b = AssetKey::new("dam-17", "sepsis panel.oet");
        assert_eq!(a, b);
        assert_eq!(a.ticket(), "dam-17");
        assert_eq!(a.filename(), "sepsis panel.oet");
    }

    #[test]
    fn test_key_display() {
        let key = AssetKey::new("DAM-2", "a.oet");
        assert_eq!(key.to_string(), "dam-2/a.oet");
    }
}
