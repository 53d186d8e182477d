use serde::{Deserialize, Serialize};

use super::node::Commit;

/// A parent link between two commits, as a renderer draws it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Child commit ID
    pub from: String,
    /// Parent commit ID
    pub to: String,
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Link to the first parent; follows the branch line
    Regular,
    /// Link from a merge commit to the branch it merged in
    Merge,
}

impl Edge {
    /// One edge per parent of `commit`, first parent first.
    pub fn from_commit(commit: &Commit) -> Vec<Edge> {
        commit
            .parent_ids
            .iter()
            .enumerate()
            .map(|(index, parent)| Edge {
                from: commit.id.clone(),
                to: parent.clone(),
                edge_type: if index == 0 {
                    EdgeType::Regular
                } else {
                    EdgeType::Merge
                },
            })
            .collect()
    }
}
