use serde::{Deserialize, Serialize};

/// A named pointer to a head commit, with its first-parent history cached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    /// Commit the branch points to; `None` only before the first commit
    pub head_commit_id: Option<String>,
    /// First-parent history, oldest first; the last entry is the head
    pub commit_ids: Vec<String>,
    /// Branch this one was forked from
    pub base_branch: Option<String>,
    /// Fork point
    pub base_commit_id: Option<String>,
}

impl Branch {
    /// An empty branch with no commits and no base.
    pub(crate) fn empty(name: String) -> Self {
        Self {
            name,
            head_commit_id: None,
            commit_ids: Vec::new(),
            base_branch: None,
            base_commit_id: None,
        }
    }

    /// A new branch starting at `source`'s current head.
    pub(crate) fn fork(source: &Branch, name: String) -> Self {
        Self {
            name,
            head_commit_id: source.head_commit_id.clone(),
            commit_ids: source.commit_ids.clone(),
            base_branch: Some(source.name.clone()),
            base_commit_id: source.head_commit_id.clone(),
        }
    }

    /// Move the head to a newly created commit.
    pub(crate) fn advance(&mut self, commit_id: String) {
        self.commit_ids.push(commit_id.clone());
        self.head_commit_id = Some(commit_id);
    }

    pub fn head(&self) -> Option<&str> {
        self.head_commit_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.commit_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commit_ids.is_empty()
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.commit_ids.iter().any(|id| id == commit_id)
    }
}
