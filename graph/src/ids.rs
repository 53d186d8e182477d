//! Identifier sources for commits and rebase-generated branch names.

use uuid::Uuid;

/// Supplies fresh identifiers to a [`CommitGraph`](crate::CommitGraph).
///
/// The graph still checks every value against what it already holds and asks
/// again on a clash, so an implementation only has to be collision-resistant,
/// not collision-free.
pub trait IdGenerator: Send {
    /// A new commit ID.
    fn commit_id(&mut self) -> String;

    /// A short token of `len` characters for a rebased branch name.
    fn suffix(&mut self, len: usize) -> String;
}

/// Random IDs backed by UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn commit_id(&mut self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn suffix(&mut self, len: usize) -> String {
        let token = Uuid::new_v4().simple().to_string();
        token[..len.clamp(1, token.len())].to_string()
    }
}

/// Deterministic IDs for tests and reproducible sessions: `C0`, `C1`, ... for
/// commits and zero-padded counters for suffixes.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next_commit: u64,
    next_suffix: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn commit_id(&mut self) -> String {
        let id = format!("C{}", self.next_commit);
        self.next_commit += 1;
        id
    }

    fn suffix(&mut self, len: usize) -> String {
        self.next_suffix += 1;
        format!("{:0width$}", self.next_suffix, width = len.max(1))
    }
}
