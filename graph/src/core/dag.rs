use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::Utc;
use smallvec::smallvec;
use tracing::{debug, info, warn};

use super::branch::Branch;
use super::edge::Edge;
use super::node::{Commit, ParentIds};
use crate::config::GraphConfig;
use crate::error::{GraphError, InvariantViolation, Result};
use crate::events::{EventBus, EventHandler, EventLogger, GraphEvent};
use crate::ids::{IdGenerator, RandomIds};
use crate::snapshot::GraphSnapshot;

/// Draws after which a generated value gets a disambiguating tail.
const MAX_ID_ATTEMPTS: u32 = 8;

/// In-memory commit graph: named branches over an append-only set of commits.
///
/// All mutation goes through [`create_branch`](Self::create_branch),
/// [`commit`](Self::commit), [`merge`](Self::merge) and
/// [`rebase`](Self::rebase). Each validates its inputs before touching
/// anything, so a returned error always leaves the graph as it was.
pub struct CommitGraph {
    branches: HashMap<String, Branch>,
    /// Live branch names in creation order
    branch_order: Vec<String>,
    commits: HashMap<String, Commit>,
    /// Names retired or handed out by rebase; never generated again
    used_names: HashSet<String>,
    next_seq: u64,
    author: String,
    suffix_len: usize,
    ids: Box<dyn IdGenerator>,
    events: EventBus,
}

impl CommitGraph {
    /// A graph with the default configuration and random IDs.
    pub fn new() -> Self {
        Self::with_config(&GraphConfig::default())
    }

    pub fn with_config(config: &GraphConfig) -> Self {
        Self::with_ids(config, RandomIds)
    }

    /// A graph drawing its IDs from `ids`.
    ///
    /// Starts with one branch, `config.trunk`, holding a single root commit.
    pub fn with_ids<G: IdGenerator + 'static>(config: &GraphConfig, ids: G) -> Self {
        let mut graph = Self {
            branches: HashMap::new(),
            branch_order: Vec::new(),
            commits: HashMap::new(),
            used_names: HashSet::new(),
            next_seq: 0,
            author: config.author.clone(),
            suffix_len: config.rebase_suffix_len.max(1),
            ids: Box::new(ids),
            events: EventBus::new(config.event_log_capacity),
        };

        let trunk = config.trunk.clone();
        graph.insert_branch(Branch::empty(trunk.clone()));
        let author = graph.author.clone();
        let root = graph.record_commit(&trunk, config.initial_message.clone(), smallvec![], author);
        graph.advance_branch(&trunk, &root.id);

        graph.events.publish_all(vec![
            GraphEvent::BranchCreated {
                name: trunk.clone(),
                source: None,
                head: None,
            },
            GraphEvent::CommitAdded {
                branch: trunk.clone(),
                commit_id: root.id.clone(),
            },
        ]);
        debug!(branch = %trunk, root = %root.id, "initialized commit graph");
        graph.debug_check();
        graph
    }

    /// Register an observer for every future mutation event.
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// Recent events, including those published before any subscriber existed.
    pub fn event_log(&self) -> &EventLogger {
        self.events.log()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Fork `new_name` from `source`'s current head.
    pub fn create_branch(&mut self, source: &str, new_name: &str) -> Result<Branch> {
        let source_branch = self.live(source)?;
        if new_name.trim().is_empty() {
            return Err(GraphError::InvalidBranchName(new_name.to_string()));
        }
        if self.branches.contains_key(new_name) {
            return Err(GraphError::DuplicateBranch(new_name.to_string()));
        }

        let branch = Branch::fork(source_branch, new_name.to_string());
        self.insert_branch(branch.clone());

        debug!(source, branch = new_name, head = ?branch.head_commit_id, "created branch");
        self.events.publish_all(vec![GraphEvent::BranchCreated {
            name: branch.name.clone(),
            source: Some(source.to_string()),
            head: branch.head_commit_id.clone(),
        }]);
        self.debug_check();
        Ok(branch)
    }

    /// Append a commit with `message` to `branch`.
    pub fn commit(&mut self, branch: &str, message: &str) -> Result<Commit> {
        let parents: ParentIds = match self.live(branch)?.head() {
            Some(head) => smallvec![head.to_string()],
            None => smallvec![],
        };

        let author = self.author.clone();
        let commit = self.record_commit(branch, message.to_string(), parents, author);
        self.advance_branch(branch, &commit.id);

        debug!(branch, commit = %commit.id, "created commit");
        self.events.publish_all(vec![GraphEvent::CommitAdded {
            branch: branch.to_string(),
            commit_id: commit.id.clone(),
        }]);
        self.debug_check();
        Ok(commit)
    }

    /// Merge `source` into `target` with a two-parent commit on `target`.
    ///
    /// The parents are `[target head, source head]`. `source` does not move.
    pub fn merge(&mut self, source: &str, target: &str) -> Result<Commit> {
        if source == target {
            return Err(GraphError::SelfMerge(source.to_string()));
        }
        let source_head = self.live(source)?.head_commit_id.clone();
        let target_head = self.live(target)?.head_commit_id.clone();

        let parents: ParentIds = [target_head, source_head].into_iter().flatten().collect();
        let message = format!("Merge branch '{}' into {}", source, target);
        let author = self.author.clone();
        let commit = self.record_commit(target, message, parents, author);
        self.advance_branch(target, &commit.id);

        info!(source, target, commit = %commit.id, "merged branch");
        self.events.publish_all(vec![GraphEvent::Merged {
            source: source.to_string(),
            target: target.to_string(),
            commit_id: commit.id.clone(),
        }]);
        self.debug_check();
        Ok(commit)
    }

    /// Replay the commits unique to `branch` on top of `onto`.
    ///
    /// The replay lands on a new branch named `<branch>-rebased-<suffix>`,
    /// which is returned; `branch` itself is retired. The old commits stay in
    /// the graph.
    pub fn rebase(&mut self, branch: &str, onto: &str) -> Result<Branch> {
        if branch == onto {
            return Err(GraphError::SelfRebase(branch.to_string()));
        }
        let replay: Vec<(String, String)> = self
            .unique_commits(branch, onto)?
            .into_iter()
            .map(|commit| (commit.message.clone(), commit.author.clone()))
            .collect();

        let new_name = self.fresh_rebase_name(branch);
        let mut rebased = Branch::fork(self.live(onto)?, new_name.clone());
        let mut events = vec![GraphEvent::BranchCreated {
            name: new_name.clone(),
            source: Some(onto.to_string()),
            head: rebased.head_commit_id.clone(),
        }];

        let mut replayed = Vec::with_capacity(replay.len());
        for (message, author) in replay {
            let parents: ParentIds = match rebased.head() {
                Some(head) => smallvec![head.to_string()],
                None => smallvec![],
            };
            let commit = self.record_commit(&new_name, message, parents, author);
            rebased.advance(commit.id.clone());
            events.push(GraphEvent::CommitAdded {
                branch: new_name.clone(),
                commit_id: commit.id.clone(),
            });
            replayed.push(commit.id);
        }

        self.retire_branch(branch);
        self.insert_branch(rebased.clone());

        info!(
            branch,
            onto,
            new_branch = %new_name,
            replayed = replayed.len(),
            "rebased branch"
        );
        events.push(GraphEvent::Rebased {
            old: branch.to_string(),
            new: new_name,
            onto: onto.to_string(),
            replayed,
        });
        events.push(GraphEvent::BranchRetired {
            name: branch.to_string(),
        });
        self.events.publish_all(events);
        self.debug_check();
        Ok(rebased)
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn branch(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    pub fn commit_by_id(&self, id: &str) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Live branches in creation order.
    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branch_order
            .iter()
            .filter_map(move |name| self.branches.get(name))
    }

    pub fn branch_names(&self) -> Vec<&str> {
        self.branch_order.iter().map(String::as_str).collect()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// The commit `name` points at, or `None` for a branch with no commits.
    pub fn head_commit(&self, name: &str) -> Result<Option<&Commit>> {
        let branch = self.live(name)?;
        Ok(branch.head().and_then(|id| self.commits.get(id)))
    }

    /// Commits on `branch` that do not appear in `onto`'s history, oldest first.
    pub fn unique_commits(&self, branch: &str, onto: &str) -> Result<Vec<&Commit>> {
        let branch = self.live(branch)?;
        let onto = self.live(onto)?;
        let onto_ids: HashSet<&str> = onto.commit_ids.iter().map(String::as_str).collect();

        Ok(branch
            .commit_ids
            .iter()
            .filter(|id| !onto_ids.contains(id.as_str()))
            .filter_map(|id| self.commits.get(id))
            .collect())
    }

    /// All commits ordered by creation.
    pub fn commits(&self) -> Vec<&Commit> {
        let mut commits: Vec<&Commit> = self.commits.values().collect();
        commits.sort_by_key(|commit| commit.seq);
        commits
    }

    /// Parent links of every commit, in creation order.
    pub fn edges(&self) -> Vec<Edge> {
        self.commits()
            .into_iter()
            .flat_map(Edge::from_commit)
            .collect()
    }

    /// IDs reachable from any live head through any parent link.
    pub fn reachable_commits(&self) -> HashSet<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = self.branches.values().filter_map(Branch::head).collect();

        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(commit) = self.commits.get(id) {
                queue.extend(commit.parent_ids.iter().map(String::as_str));
            }
        }
        seen
    }

    /// Commits no live branch can reach, such as the originals of a rebase.
    pub fn unreachable_commits(&self) -> Vec<&Commit> {
        let reachable = self.reachable_commits();
        self.commits()
            .into_iter()
            .filter(|commit| !reachable.contains(commit.id.as_str()))
            .collect()
    }

    /// Deep copy of the current state for rendering.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            branches: self.branches().cloned().collect(),
            commits: self
                .commits
                .iter()
                .map(|(id, commit)| (id.clone(), commit.clone()))
                .collect(),
        }
    }

    pub fn stats(&self) -> GraphStats {
        let parents: HashSet<&str> = self
            .commits
            .values()
            .flat_map(|commit| commit.parent_ids.iter().map(String::as_str))
            .collect();

        GraphStats {
            total_commits: self.commits.len(),
            merge_commits: self.commits.values().filter(|c| c.is_merge()).count(),
            root_commits: self.commits.values().filter(|c| c.is_root()).count(),
            leaf_commits: self
                .commits
                .keys()
                .filter(|id| !parents.contains(id.as_str()))
                .count(),
            live_branches: self.branches.len(),
            unreachable_commits: self.unreachable_commits().len(),
        }
    }

    /// Verify the structural invariants of the graph.
    ///
    /// A violation means the graph itself is broken; user input can never
    /// cause one.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        for branch in self.branches() {
            if branch.head() != branch.commit_ids.last().map(String::as_str) {
                return Err(InvariantViolation::HeadMismatch {
                    branch: branch.name.clone(),
                });
            }
            if let Some(head) = branch.head() {
                if !self.commits.contains_key(head) {
                    return Err(InvariantViolation::DanglingHead {
                        branch: branch.name.clone(),
                        commit_id: head.to_string(),
                    });
                }
            }

            let mut previous: Option<&str> = None;
            for id in &branch.commit_ids {
                let commit = self.commits.get(id).ok_or_else(|| {
                    InvariantViolation::MissingBranchCommit {
                        branch: branch.name.clone(),
                        commit_id: id.clone(),
                    }
                })?;
                if commit.first_parent() != previous {
                    return Err(InvariantViolation::BrokenChain {
                        branch: branch.name.clone(),
                        commit_id: id.clone(),
                    });
                }
                previous = Some(id.as_str());
            }
        }

        for commit in self.commits.values() {
            if commit.parent_ids.len() > 2 {
                return Err(InvariantViolation::ParentCount {
                    commit_id: commit.id.clone(),
                    count: commit.parent_ids.len(),
                });
            }
            for parent_id in &commit.parent_ids {
                let parent = self.commits.get(parent_id).ok_or_else(|| {
                    InvariantViolation::MissingParent {
                        commit_id: commit.id.clone(),
                        parent_id: parent_id.clone(),
                    }
                })?;
                if parent.seq >= commit.seq {
                    return Err(InvariantViolation::ForwardParent {
                        commit_id: commit.id.clone(),
                        parent_id: parent_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn live(&self, name: &str) -> Result<&Branch> {
        self.branches
            .get(name)
            .ok_or_else(|| GraphError::UnknownBranch(name.to_string()))
    }

    fn insert_branch(&mut self, branch: Branch) {
        self.branch_order.push(branch.name.clone());
        self.branches.insert(branch.name.clone(), branch);
    }

    fn retire_branch(&mut self, name: &str) {
        self.branches.remove(name);
        self.branch_order.retain(|live| live != name);
        self.used_names.insert(name.to_string());
        debug!(branch = name, "retired branch");
    }

    fn advance_branch(&mut self, name: &str, commit_id: &str) {
        if let Some(branch) = self.branches.get_mut(name) {
            branch.advance(commit_id.to_string());
        }
    }

    /// Create and store a commit. Does not move any branch.
    fn record_commit(
        &mut self,
        branch: &str,
        message: String,
        parent_ids: ParentIds,
        author: String,
    ) -> Commit {
        let id = self.fresh_commit_id();
        let commit = Commit {
            id,
            message,
            parent_ids,
            author,
            timestamp: Utc::now(),
            branch: branch.to_string(),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.commits.insert(commit.id.clone(), commit.clone());
        commit
    }

    fn fresh_commit_id(&mut self) -> String {
        let mut attempt = 0;
        loop {
            let mut id = self.ids.commit_id();
            if attempt >= MAX_ID_ATTEMPTS {
                id = format!("{}-{}", id, self.next_seq);
            }
            if !self.commits.contains_key(&id) {
                return id;
            }
            warn!(%id, attempt, "commit id collision, drawing again");
            attempt += 1;
        }
    }

    fn fresh_rebase_name(&mut self, branch: &str) -> String {
        let mut attempt = 0;
        loop {
            let suffix = self.ids.suffix(self.suffix_len);
            let name = if attempt < MAX_ID_ATTEMPTS {
                format!("{}-rebased-{}", branch, suffix)
            } else {
                format!("{}-rebased-{}{}", branch, suffix, attempt)
            };
            if !self.branches.contains_key(&name) && !self.used_names.contains(&name) {
                self.used_names.insert(name.clone());
                return name;
            }
            warn!(%name, attempt, "rebase branch name taken, drawing again");
            attempt += 1;
        }
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = self.check_invariants() {
                panic!("commit graph invariant violated: {violation}");
            }
        }
    }
}

impl Default for CommitGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommitGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitGraph")
            .field("branches", &self.branch_order)
            .field("commits", &self.commits.len())
            .field("subscribers", &self.events.handler_count())
            .finish()
    }
}

/// Counts describing the shape of a [`CommitGraph`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    /// Commits that are nobody's parent
    pub leaf_commits: usize,
    pub live_branches: usize,
    pub unreachable_commits: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChannelHandler;
    use crate::ids::SequentialIds;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::channel;

    fn test_graph() -> CommitGraph {
        CommitGraph::with_ids(&GraphConfig::default(), SequentialIds::new())
    }

    fn ids(branch: &Branch) -> Vec<&str> {
        branch.commit_ids.iter().map(String::as_str).collect()
    }

    /// Always returns the same values, to exercise collision handling.
    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn commit_id(&mut self) -> String {
            "same".to_string()
        }

        fn suffix(&mut self, _len: usize) -> String {
            "x".to_string()
        }
    }

    #[test]
    fn test_initial_state() {
        let graph = test_graph();

        assert_eq!(graph.branch_names(), vec!["main"]);
        let main = graph.branch("main").unwrap();
        assert_eq!(ids(main), vec!["C0"]);
        assert_eq!(main.head(), Some("C0"));
        assert_eq!(main.base_branch, None);

        let root = graph.commit_by_id("C0").unwrap();
        assert_eq!(root.message, "Initial commit");
        assert!(root.is_root());
        assert_eq!(root.author, "learner");
        assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn test_custom_trunk() {
        let config = GraphConfig {
            trunk: "trunk".to_string(),
            initial_message: "root".to_string(),
            ..GraphConfig::default()
        };
        let graph = CommitGraph::with_ids(&config, SequentialIds::new());
        assert_eq!(graph.branch_names(), vec!["trunk"]);
        assert_eq!(graph.head_commit("trunk").unwrap().unwrap().message, "root");
    }

    #[test]
    fn test_create_branch_errors() {
        let mut graph = test_graph();

        assert_eq!(
            graph.create_branch("nope", "feature"),
            Err(GraphError::UnknownBranch("nope".to_string()))
        );
        assert_eq!(
            graph.create_branch("main", "main"),
            Err(GraphError::DuplicateBranch("main".to_string()))
        );
        assert_eq!(
            graph.create_branch("main", "  "),
            Err(GraphError::InvalidBranchName("  ".to_string()))
        );
        assert_eq!(graph.branch_count(), 1);
    }

    #[test]
    fn test_commit_unknown_branch_consumes_no_id() {
        let mut graph = test_graph();
        assert_eq!(
            graph.commit("ghost", "boo"),
            Err(GraphError::UnknownBranch("ghost".to_string()))
        );
        assert_eq!(graph.commit("main", "next").unwrap().id, "C1");
    }

    #[test]
    fn test_merge_parents_and_message() {
        let mut graph = test_graph();
        graph.create_branch("main", "feature").unwrap();
        graph.commit("feature", "work").unwrap();
        graph.commit("main", "hotfix").unwrap();

        let merge = graph.merge("feature", "main").unwrap();
        assert_eq!(merge.parent_ids.as_slice(), ["C2".to_string(), "C1".to_string()]);
        assert_eq!(merge.message, "Merge branch 'feature' into main");
        assert_eq!(merge.branch, "main");
        assert_eq!(graph.branch("feature").unwrap().head(), Some("C1"));
        assert_eq!(ids(graph.branch("main").unwrap()), vec!["C0", "C2", "C3"]);
    }

    #[test]
    fn test_merge_unknown_branch() {
        let mut graph = test_graph();
        assert_eq!(
            graph.merge("ghost", "main"),
            Err(GraphError::UnknownBranch("ghost".to_string()))
        );
        assert_eq!(
            graph.merge("main", "ghost"),
            Err(GraphError::UnknownBranch("ghost".to_string()))
        );
        assert_eq!(graph.commit_count(), 1);
    }

    #[test]
    fn test_rebase_replays_unique_commits() {
        let mut graph = test_graph();
        graph.create_branch("main", "topic").unwrap();
        graph.commit("topic", "one").unwrap();
        graph.commit("topic", "two").unwrap();
        graph.commit("main", "upstream").unwrap();

        let unique: Vec<&str> = graph
            .unique_commits("topic", "main")
            .unwrap()
            .iter()
            .map(|c| c.message.as_str())
            .collect();
        assert_eq!(unique, vec!["one", "two"]);

        let rebased = graph.rebase("topic", "main").unwrap();
        assert_eq!(rebased.name, "topic-rebased-0001");
        assert_eq!(ids(&rebased), vec!["C0", "C3", "C4", "C5"]);
        assert_eq!(rebased.base_branch.as_deref(), Some("main"));
        assert_eq!(rebased.base_commit_id.as_deref(), Some("C3"));
        assert_eq!(graph.commit_by_id("C4").unwrap().message, "one");
        assert_eq!(graph.commit_by_id("C4").unwrap().parent_ids.as_slice(), ["C3".to_string()]);
        assert_eq!(graph.commit_by_id("C5").unwrap().message, "two");
        assert_eq!(graph.commit_by_id("C5").unwrap().branch, "topic-rebased-0001");

        assert!(!graph.has_branch("topic"));
        assert_eq!(graph.branch_names(), vec!["main", "topic-rebased-0001"]);

        let garbage: Vec<&str> = graph
            .unreachable_commits()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(garbage, vec!["C1", "C2"]);
    }

    #[test]
    fn test_rebase_without_unique_commits() {
        let mut graph = test_graph();
        graph.create_branch("main", "idle").unwrap();
        graph.commit("main", "ahead").unwrap();

        let rebased = graph.rebase("idle", "main").unwrap();
        assert_eq!(ids(&rebased), ids(graph.branch("main").unwrap()));
        assert_eq!(graph.commit_count(), 2);
    }

    #[test]
    fn test_rebase_errors_before_mutation() {
        let mut graph = test_graph();
        assert_eq!(
            graph.rebase("x", "x"),
            Err(GraphError::SelfRebase("x".to_string()))
        );
        assert_eq!(
            graph.rebase("ghost", "main"),
            Err(GraphError::UnknownBranch("ghost".to_string()))
        );
        assert_eq!(
            graph.rebase("main", "ghost"),
            Err(GraphError::UnknownBranch("ghost".to_string()))
        );
        assert_eq!(graph.branch_names(), vec!["main"]);
    }

    #[test]
    fn test_rebased_names_never_repeat() {
        let mut graph = test_graph();
        graph.create_branch("main", "a").unwrap();
        let first = graph.rebase("a", "main").unwrap();
        graph.create_branch("main", "a").unwrap();
        let second = graph.rebase("a", "main").unwrap();
        assert_ne!(first.name, second.name);
    }

    #[test]
    fn test_collisions_are_redrawn() {
        let mut graph = CommitGraph::with_ids(&GraphConfig::default(), StuckIds);
        let second = graph.commit("main", "second").unwrap();
        let third = graph.commit("main", "third").unwrap();
        assert_ne!(second.id, third.id);
        assert_eq!(graph.commit_count(), 3);

        graph.create_branch("main", "t").unwrap();
        let first = graph.rebase("t", "main").unwrap();
        graph.create_branch("main", "t").unwrap();
        let again = graph.rebase("t", "main").unwrap();
        assert_eq!(first.name, "t-rebased-x");
        assert_eq!(again.name, "t-rebased-x8");
        assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn test_events_published_in_order() {
        let mut graph = test_graph();
        let (tx, rx) = channel();
        graph.subscribe(Box::new(ChannelHandler::new(tx)));

        graph.create_branch("main", "f").unwrap();
        graph.commit("f", "work").unwrap();
        graph.merge("main", "main").unwrap_err();
        graph.rebase("f", "main").unwrap();

        let events: Vec<GraphEvent> = rx.try_iter().collect();
        let kinds: Vec<&str> = events.iter().map(GraphEvent::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "branch_created",
                "commit_added",
                "branch_created",
                "commit_added",
                "rebased",
                "branch_retired",
            ]
        );
        assert_eq!(
            events[4],
            GraphEvent::Rebased {
                old: "f".to_string(),
                new: "f-rebased-0001".to_string(),
                onto: "main".to_string(),
                replayed: vec!["C2".to_string()],
            }
        );
        // the initial branch and root commit are logged as well
        assert_eq!(graph.event_log().len(), 8);
    }

    #[test]
    fn test_stats() {
        let mut graph = test_graph();
        graph.create_branch("main", "f").unwrap();
        graph.commit("f", "a").unwrap();
        graph.merge("f", "main").unwrap();
        graph.create_branch("main", "g").unwrap();
        graph.commit("g", "b").unwrap();
        graph.rebase("g", "f").unwrap();

        assert_eq!(
            graph.stats(),
            GraphStats {
                total_commits: 6,
                merge_commits: 1,
                root_commits: 1,
                leaf_commits: 2,
                live_branches: 3,
                unreachable_commits: 1,
            }
        );
    }

    #[test]
    fn test_edges_mark_merge_parent() {
        let mut graph = test_graph();
        graph.create_branch("main", "f").unwrap();
        graph.commit("f", "a").unwrap();
        graph.merge("f", "main").unwrap();

        let edges = graph.edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[1], Edge::from_commit(graph.commit_by_id("C2").unwrap())[0]);
        assert_eq!(edges[2].to, "C1");
        assert_eq!(edges[2].edge_type, crate::EdgeType::Merge);
    }

    #[test]
    fn test_check_invariants_detects_corruption() {
        let mut graph = test_graph();
        graph.commit("main", "a").unwrap();

        if let Some(main) = graph.branches.get_mut("main") {
            main.head_commit_id = Some("missing".to_string());
        }
        assert_eq!(
            graph.check_invariants(),
            Err(InvariantViolation::HeadMismatch {
                branch: "main".to_string()
            })
        );

        if let Some(main) = graph.branches.get_mut("main") {
            main.commit_ids.push("missing".to_string());
        }
        assert_eq!(
            graph.check_invariants(),
            Err(InvariantViolation::DanglingHead {
                branch: "main".to_string(),
                commit_id: "missing".to_string(),
            })
        );
    }

    #[test]
    fn test_check_invariants_detects_forward_parent() {
        let mut graph = test_graph();
        graph.commit("main", "a").unwrap();
        if let Some(root) = graph.commits.get_mut("C0") {
            root.seq = 10;
        }
        assert!(matches!(
            graph.check_invariants(),
            Err(InvariantViolation::ForwardParent { .. })
        ));
    }
}
