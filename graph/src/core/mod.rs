pub mod node;
pub mod branch;
pub mod edge;
pub mod dag;

pub use node::{Commit, ParentIds};
pub use branch::Branch;
pub use edge::{Edge, EdgeType};
pub use dag::{CommitGraph, GraphStats};
