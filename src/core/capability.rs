//! The capability table - the closed set of optional operations a backend
//! may support.
//!
//! Capabilities are facts about a concrete backend instance, not
//! configuration. A capability is present or absent; there is no partial
//! credit.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named optional operation a backend instance may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Fetch a single work unit
    Read,
    /// Enumerate work units
    List,
    /// Download a file attachment
    DownloadAttachment,
    /// Retrieve comments
    FetchComments,
    /// Post a comment
    Comment,
    /// Change work-unit status
    UpdateStatus,
    /// Add/remove labels
    ManageLabels,
    /// Capture a read-only snapshot of the source
    Snapshot,
    /// Create a pull/merge request
    CreatePr,
    /// Link a git branch to a work unit
    LinkBranch,
    /// Create a new work unit
    CreateWorkUnit,
    /// Fetch subtasks of a work unit
    FetchSubtasks,
}

impl Capability {
    /// Every entry of the closed capability table, in declaration order.
    pub const ALL: [Capability; 12] = [
        Capability::Read,
        Capability::List,
        Capability::DownloadAttachment,
        Capability::FetchComments,
        Capability::Comment,
        Capability::UpdateStatus,
        Capability::ManageLabels,
        Capability::Snapshot,
        Capability::CreatePr,
        Capability::LinkBranch,
        Capability::CreateWorkUnit,
        Capability::FetchSubtasks,
    ];

    /// Get the stable string identifier for this capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::List => "list",
            Capability::DownloadAttachment => "download_attachment",
            Capability::FetchComments => "fetch_comments",
            Capability::Comment => "comment",
            Capability::UpdateStatus => "update_status",
            Capability::ManageLabels => "manage_labels",
            Capability::Snapshot => "snapshot",
            Capability::CreatePr => "create_pr",
            Capability::LinkBranch => "link_branch",
            Capability::CreateWorkUnit => "create_work_unit",
            Capability::FetchSubtasks => "fetch_subtasks",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = CapabilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| CapabilityParseError(s.to_string()))
    }
}

/// Error returned when parsing an unknown capability identifier.
#[derive(Debug, Clone)]
pub struct CapabilityParseError(pub String);

impl fmt::Display for CapabilityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown capability '{}'", self.0)
    }
}

impl std::error::Error for CapabilityParseError {}

/// The set of capabilities possessed by one concrete backend instance.
///
/// Computed once per instance (or declared by the backend at construction)
/// and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: HashSet<Capability>,
}

impl CapabilitySet {
    /// Create an empty capability set.
    pub fn new() -> Self {
        CapabilitySet::default()
    }

    /// Check whether a capability is present.
    pub fn has(&self, cap: Capability) -> bool {
        self.entries.contains(&cap)
    }

    /// Add a capability to the set.
    pub fn insert(&mut self, cap: Capability) {
        self.entries.insert(cap);
    }

    /// Number of capabilities in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the capabilities, in table order for determinism.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .iter()
            .copied()
            .filter(|c| self.entries.contains(c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        CapabilitySet {
            entries: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cap in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", cap)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_roundtrip() {
        for cap in Capability::ALL {
            assert_eq!(cap.as_str().parse::<Capability>().unwrap(), cap);
        }
        assert!("teleport".parse::<Capability>().is_err());
    }

    #[test]
    fn test_capability_strings_are_stable() {
        assert_eq!(Capability::Read.to_string(), "read");
        assert_eq!(
            Capability::DownloadAttachment.to_string(),
            "download_attachment"
        );
        assert_eq!(Capability::CreatePr.to_string(), "create_pr");
        assert_eq!(Capability::CreateWorkUnit.to_string(), "create_work_unit");
    }

    #[test]
    fn test_capability_set_has() {
        let set: CapabilitySet = [Capability::Read, Capability::Comment].into_iter().collect();

        assert!(set.has(Capability::Read));
        assert!(set.has(Capability::Comment));
        assert!(!set.has(Capability::List));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_capability_set_display_is_deterministic() {
        let set: CapabilitySet = [Capability::Comment, Capability::Read, Capability::List]
            .into_iter()
            .collect();

        // Table order, not insertion order
        assert_eq!(set.to_string(), "read, list, comment");
    }

    #[test]
    fn test_empty_set() {
        let set = CapabilitySet::new();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "");
    }
}
