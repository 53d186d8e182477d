use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Branch, Commit, Edge};

/// Immutable copy of a graph's branches and commits, handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Live branches in creation order
    pub branches: Vec<Branch>,
    pub commits: BTreeMap<String, Commit>,
}

impl GraphSnapshot {
    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.iter().find(|branch| branch.name == name)
    }

    pub fn commit(&self, id: &str) -> Option<&Commit> {
        self.commits.get(id)
    }

    /// Head commit of `name`, if the branch exists and has one.
    pub fn head(&self, name: &str) -> Option<&Commit> {
        self.branch(name)
            .and_then(Branch::head)
            .and_then(|id| self.commits.get(id))
    }

    /// Commits of `name` oldest first, resolved from its ID list.
    pub fn history(&self, name: &str) -> Vec<&Commit> {
        self.branch(name)
            .map(|branch| {
                branch
                    .commit_ids
                    .iter()
                    .filter_map(|id| self.commits.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parent links in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut commits: Vec<&Commit> = self.commits.values().collect();
        commits.sort_by_key(|commit| commit.seq);
        commits.into_iter().flat_map(Edge::from_commit).collect()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
