use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Parent links of a commit: none for the root, one normally, two for a merge.
pub type ParentIds = SmallVec<[String; 2]>;

/// A commit node in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Unique commit ID, generated by the graph
    pub id: String,
    /// Commit message, stored verbatim
    pub message: String,
    /// Parent commit IDs, first parent first
    pub parent_ids: ParentIds,
    /// Author name
    pub author: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Branch the commit was created on
    pub branch: String,
    /// Creation order inside the graph
    pub seq: u64,
}

impl Commit {
    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Check if this is a merge commit (two parents)
    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }

    /// First seven characters of the ID, for display.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}
