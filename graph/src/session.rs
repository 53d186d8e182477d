//! A learner's session over a [`CommitGraph`]: a current branch plus the
//! one-call-per-action commands a UI issues, and a small line-based script
//! format for replaying them.

use std::fmt;

use tracing::debug;

use crate::config::GraphConfig;
use crate::core::{Branch, Commit, CommitGraph};
use crate::error::{GraphError, SessionError};
use crate::events::EventHandler;
use crate::ids::IdGenerator;

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fork a branch from the current one
    Branch(String),
    Checkout(String),
    /// Commit on the current branch
    Commit(String),
    /// Merge the current branch into the trunk
    MergeIntoTrunk,
    Merge { source: String, target: String },
    /// Rebase the current branch onto the trunk
    RebaseOntoTrunk,
    Rebase { branch: String, onto: String },
}

impl Command {
    /// Parse one script line. Blank lines and `#` comments yield `None`.
    ///
    /// ```text
    /// branch <name>
    /// checkout <name>
    /// commit <message...>
    /// merge [<source> <target>]
    /// rebase [<branch> <onto>]
    /// ```
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match verb {
            "branch" => Command::Branch(single_arg(verb, &args)?),
            "checkout" => Command::Checkout(single_arg(verb, &args)?),
            "commit" => {
                let message = unquote(rest);
                if message.is_empty() {
                    return Err("commit needs a message".to_string());
                }
                Command::Commit(message.to_string())
            }
            "merge" => match args.as_slice() {
                [] => Command::MergeIntoTrunk,
                [source, target] => Command::Merge {
                    source: source.to_string(),
                    target: target.to_string(),
                },
                _ => return Err("usage: merge [<source> <target>]".to_string()),
            },
            "rebase" => match args.as_slice() {
                [] => Command::RebaseOntoTrunk,
                [branch, onto] => Command::Rebase {
                    branch: branch.to_string(),
                    onto: onto.to_string(),
                },
                _ => return Err("usage: rebase [<branch> <onto>]".to_string()),
            },
            other => return Err(format!("unknown command '{}'", other)),
        };
        Ok(Some(command))
    }
}

fn single_arg(verb: &str, args: &[&str]) -> Result<String, String> {
    match args {
        [name] => Ok(name.to_string()),
        _ => Err(format!("usage: {} <name>", verb)),
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(text)
}

/// What a successful [`Command`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    BranchCreated(Branch),
    CheckedOut(String),
    Committed(Commit),
    Merged(Commit),
    Rebased {
        old: String,
        branch: Branch,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BranchCreated(branch) => write!(f, "created branch {}", branch.name),
            Outcome::CheckedOut(name) => write!(f, "switched to {}", name),
            Outcome::Committed(commit) => {
                write!(f, "[{} {}] {}", commit.branch, commit.short_id(), commit.message)
            }
            Outcome::Merged(commit) => {
                write!(f, "[{} {}] {}", commit.branch, commit.short_id(), commit.message)
            }
            Outcome::Rebased { old, branch } => {
                write!(f, "rebased {} as {}", old, branch.name)
            }
        }
    }
}

/// A graph plus the branch the learner is on.
#[derive(Debug)]
pub struct Session {
    graph: CommitGraph,
    trunk: String,
    current: String,
}

impl Session {
    pub fn new(config: &GraphConfig) -> Self {
        Self::start(CommitGraph::with_config(config), config)
    }

    pub fn with_ids<G: IdGenerator + 'static>(config: &GraphConfig, ids: G) -> Self {
        Self::start(CommitGraph::with_ids(config, ids), config)
    }

    fn start(graph: CommitGraph, config: &GraphConfig) -> Self {
        Self {
            graph,
            trunk: config.trunk.clone(),
            current: config.trunk.clone(),
        }
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn into_graph(self) -> CommitGraph {
        self.graph
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn trunk(&self) -> &str {
        &self.trunk
    }

    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.graph.subscribe(handler);
    }

    pub fn checkout(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.graph.has_branch(name) {
            return Err(GraphError::UnknownBranch(name.to_string()).into());
        }
        debug!(from = %self.current, to = name, "checkout");
        self.current = name.to_string();
        Ok(())
    }

    /// Fork `name` from the current branch. The current branch does not change.
    pub fn create_branch(&mut self, name: &str) -> Result<Branch, SessionError> {
        Ok(self.graph.create_branch(&self.current, name)?)
    }

    pub fn commit(&mut self, message: &str) -> Result<Commit, SessionError> {
        if message.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        Ok(self.graph.commit(&self.current, message)?)
    }

    pub fn merge_into_trunk(&mut self) -> Result<Commit, SessionError> {
        self.ensure_off_trunk()?;
        Ok(self.graph.merge(&self.current, &self.trunk)?)
    }

    /// Rebase the current branch onto the trunk and switch to the result.
    pub fn rebase_onto_trunk(&mut self) -> Result<Branch, SessionError> {
        self.ensure_off_trunk()?;
        let current = self.current.clone();
        let trunk = self.trunk.clone();
        self.rebase(&current, &trunk)
    }

    pub fn merge(&mut self, source: &str, target: &str) -> Result<Commit, SessionError> {
        Ok(self.graph.merge(source, target)?)
    }

    /// Rebase any branch; if it was the current one, follow it to its new name.
    pub fn rebase(&mut self, branch: &str, onto: &str) -> Result<Branch, SessionError> {
        let rebased = self.graph.rebase(branch, onto)?;
        if self.current == branch {
            self.current = rebased.name.clone();
        }
        Ok(rebased)
    }

    pub fn apply(&mut self, command: &Command) -> Result<Outcome, SessionError> {
        match command {
            Command::Branch(name) => self.create_branch(name).map(Outcome::BranchCreated),
            Command::Checkout(name) => {
                self.checkout(name)?;
                Ok(Outcome::CheckedOut(name.clone()))
            }
            Command::Commit(message) => self.commit(message).map(Outcome::Committed),
            Command::MergeIntoTrunk => self.merge_into_trunk().map(Outcome::Merged),
            Command::Merge { source, target } => self.merge(source, target).map(Outcome::Merged),
            Command::RebaseOntoTrunk => {
                let old = self.current.clone();
                let branch = self.rebase_onto_trunk()?;
                Ok(Outcome::Rebased { old, branch })
            }
            Command::Rebase { branch, onto } => {
                let rebased = self.rebase(branch, onto)?;
                Ok(Outcome::Rebased {
                    old: branch.clone(),
                    branch: rebased,
                })
            }
        }
    }

    /// Run every command in `script`, stopping at the first failure.
    pub fn run_script(&mut self, script: &str) -> Result<Vec<Outcome>, SessionError> {
        let mut outcomes = Vec::new();
        for (index, text) in script.lines().enumerate() {
            let line = index + 1;
            let command = match Command::parse(text) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(detail) => return Err(SessionError::Parse { line, detail }),
            };
            let outcome = self.apply(&command).map_err(|source| SessionError::Script {
                line,
                source: Box::new(source),
            })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn ensure_off_trunk(&self) -> Result<(), SessionError> {
        if self.current == self.trunk {
            return Err(SessionError::ProtectedBranch(self.trunk.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialIds;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::with_ids(&GraphConfig::default(), SequentialIds::new())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("# setup"), Ok(None));
        assert_eq!(
            Command::parse("branch feature"),
            Ok(Some(Command::Branch("feature".to_string())))
        );
        assert_eq!(
            Command::parse("commit \"add x and y\""),
            Ok(Some(Command::Commit("add x and y".to_string())))
        );
        assert_eq!(
            Command::parse("commit  fix  spacing "),
            Ok(Some(Command::Commit("fix  spacing".to_string())))
        );
        assert_eq!(Command::parse("merge"), Ok(Some(Command::MergeIntoTrunk)));
        assert_eq!(
            Command::parse("rebase topic main"),
            Ok(Some(Command::Rebase {
                branch: "topic".to_string(),
                onto: "main".to_string(),
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("commit").is_err());
        assert!(Command::parse("commit \"\"").is_err());
        assert!(Command::parse("branch").is_err());
        assert!(Command::parse("branch a b").is_err());
        assert!(Command::parse("merge a").is_err());
        assert!(Command::parse("push origin").is_err());
    }

    #[test]
    fn test_trunk_is_protected() {
        let mut session = session();
        assert!(matches!(
            session.merge_into_trunk(),
            Err(SessionError::ProtectedBranch(name)) if name == "main"
        ));
        assert!(matches!(
            session.rebase_onto_trunk(),
            Err(SessionError::ProtectedBranch(_))
        ));
        assert!(matches!(session.commit("  "), Err(SessionError::EmptyMessage)));
        assert_eq!(session.graph().commit_count(), 1);
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let mut session = session();
        assert!(matches!(
            session.checkout("nope"),
            Err(SessionError::Graph(GraphError::UnknownBranch(_)))
        ));
        assert_eq!(session.current(), "main");
    }

    #[test]
    fn test_rebase_follows_current_branch() {
        let mut session = session();
        session.create_branch("f2").unwrap();
        session.checkout("f2").unwrap();
        session.commit("only on f2").unwrap();

        let rebased = session.rebase_onto_trunk().unwrap();
        assert_eq!(session.current(), rebased.name);
        assert!(session.current().starts_with("f2-rebased-"));

        // now on the rebased branch, commits land there
        let commit = session.commit("after rebase").unwrap();
        assert_eq!(commit.branch, rebased.name);
    }

    #[test]
    fn test_run_script() {
        let mut session = session();
        let outcomes = session
            .run_script(
                "# tutorial\n\
                 branch feature\n\
                 checkout feature\n\
                 commit add x\n\
                 commit add y\n\
                 merge\n",
            )
            .unwrap();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[2].to_string(), "[feature C1] add x");
        assert_eq!(
            outcomes[4].to_string(),
            "[main C3] Merge branch 'feature' into main"
        );
        assert_eq!(session.current(), "feature");
    }

    #[test]
    fn test_run_script_reports_line() {
        let mut session = session();
        let err = session
            .run_script("branch a\n\nbranch a\ncommit never")
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Script { line: 3, ref source }
                if matches!(**source, SessionError::Graph(GraphError::DuplicateBranch(_)))
        ));
        assert_eq!(err.to_string(), "line 3: branch 'a' already exists");
        assert_eq!(session.graph().commit_count(), 1);

        let err = session.run_script("commit ok\nfrobnicate").unwrap_err();
        assert!(matches!(err, SessionError::Parse { line: 2, .. }));
    }
}
