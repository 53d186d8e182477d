//! In-memory commit graph for teaching branching, merging and rebasing.
//!
//! [`CommitGraph`] owns every branch and commit and exposes four mutations
//! (`create_branch`, `commit`, `merge`, `rebase`) plus read-only accessors and
//! [`GraphSnapshot`]s for renderers. [`Session`] layers a "current branch" on
//! top, the way an interactive UI drives the graph.

pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod ids;
pub mod session;
pub mod snapshot;

pub use config::GraphConfig;
pub use crate::core::{Branch, Commit, CommitGraph, Edge, EdgeType, GraphStats, ParentIds};
pub use error::{ConfigError, GraphError, InvariantViolation, SessionError};
pub use events::{ChannelHandler, EventHandler, EventLogger, GraphEvent};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use session::{Command, Outcome, Session};
pub use snapshot::GraphSnapshot;
