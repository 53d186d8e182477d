//! Error types for the commit graph.
//!
//! [`GraphError`] covers the user-triggerable validation failures of the four
//! mutations. [`InvariantViolation`] is only ever produced by
//! [`CommitGraph::check_invariants`](crate::CommitGraph::check_invariants) and
//! signals a bug in the graph itself.

use thiserror::Error;

/// Validation failures returned by [`CommitGraph`](crate::CommitGraph) operations.
///
/// None of these leave the graph modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The named branch is not live in the graph.
    #[error("unknown branch '{0}'")]
    UnknownBranch(String),

    /// `create_branch` was asked for a name that is already live.
    #[error("branch '{0}' already exists")]
    DuplicateBranch(String),

    /// A branch cannot be merged into itself.
    #[error("cannot merge branch '{0}' into itself")]
    SelfMerge(String),

    /// A branch cannot be rebased onto itself.
    #[error("cannot rebase branch '{0}' onto itself")]
    SelfRebase(String),

    /// Branch names must contain at least one non-whitespace character.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),
}

/// Structural corruption found by an invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("branch '{branch}' points at missing commit {commit_id}")]
    DanglingHead { branch: String, commit_id: String },

    #[error("branch '{branch}' head does not match the last entry of its commit list")]
    HeadMismatch { branch: String },

    #[error("branch '{branch}' lists missing commit {commit_id}")]
    MissingBranchCommit { branch: String, commit_id: String },

    #[error("commit {commit_id} references missing parent {parent_id}")]
    MissingParent { commit_id: String, parent_id: String },

    #[error("commit {commit_id} references parent {parent_id} created after it")]
    ForwardParent { commit_id: String, parent_id: String },

    #[error("commit {commit_id} has {count} parents")]
    ParentCount { commit_id: String, count: usize },

    #[error("branch '{branch}' commit list breaks the first-parent chain at {commit_id}")]
    BrokenChain { branch: String, commit_id: String },
}

/// Errors from the [`Session`](crate::Session) layer and script execution.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The trunk cannot be merged into or rebased onto itself from the session.
    #[error("branch '{0}' is the trunk; switch to another branch first")]
    ProtectedBranch(String),

    #[error("commit message must not be empty")]
    EmptyMessage,

    #[error("line {line}: {detail}")]
    Parse { line: usize, detail: String },

    #[error("line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<SessionError>,
    },
}

/// Errors while loading a [`GraphConfig`](crate::GraphConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{field}': {detail}")]
    Invalid { field: &'static str, detail: String },
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
