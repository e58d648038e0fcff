use serde::{Deserialize, Serialize};

/// Suffix appended to a parent's display name when the containing edge
/// reflects a published version rather than a draft.
pub const RELEASED_MARKER: &str = " (released)";

/// A direct parent relationship of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// Display name of the parent asset.
    pub name: String,
    /// The parent's own asset identifier.
    pub asset_id: i64,
    /// External cross-reference identifier for the parent.
    pub xref_id: String,
    /// Whether the edge reflects a released version of the parent.
    pub released: bool,
}

impl ParentLink {
    /// Display name with the released marker applied where appropriate.
    pub fn display_name(&self) -> String {
        if self.released {
            format!("{}{}", self.name, RELEASED_MARKER)
        } else {
            self.name.clone()
        }
    }
}

/// Buckets a parent asset is classified into for the where-used report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageBucket {
    OrderPanel,
    SmartGroup,
    OrderSet,
    Other,
}

impl UsageBucket {
    /// All buckets in report section order.
    pub const ALL: [UsageBucket; 4] = [
        UsageBucket::OrderPanel,
        UsageBucket::SmartGroup,
        UsageBucket::OrderSet,
        UsageBucket::Other,
    ];

    /// Classify a parent by case-insensitive substring match on its display
    /// name. First match wins: a name containing several keywords lands in
    /// the earliest bucket.
    pub fn classify(name: &str) -> UsageBucket {
        let lowered = name.to_lowercase();
        if lowered.contains("order panel") {
            UsageBucket::OrderPanel
        } else if lowered.contains("smart group") {
            UsageBucket::SmartGroup
        } else if lowered.contains("order set") {
            UsageBucket::OrderSet
        } else {
            UsageBucket::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UsageBucket::OrderPanel => "Order Panels",
            UsageBucket::SmartGroup => "Smart Groups",
            UsageBucket::OrderSet => "Order Sets",
            UsageBucket::Other => "Other",
        }
    }
}

/// One parent in a where-used report, with its own direct parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub parent: ParentLink,
    pub grandparents: Vec<ParentLink>,
}

impl UsageEntry {
    /// Grandparent display names for rendering, with an explicit marker
    /// when the parent has no parents of its own.
    pub fn grandparent_summary(&self) -> String {
        if self.grandparents.is_empty() {
            "none".to_string()
        } else {
            self.grandparents
                .iter()
                .map(ParentLink::display_name)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// One bucket's section of the where-used report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSection {
    pub bucket: UsageBucket,
    pub members: Vec<UsageEntry>,
}

/// Where-used report for a single target asset: one section per bucket,
/// each member annotated with its own direct parents. Depth stops at
/// grandparents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereUsedReport {
    pub target_name: String,
    pub sections: Vec<UsageSection>,
}
