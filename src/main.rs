use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graph::{GraphConfig, Outcome, Session};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The branching tutorial: fork a feature branch, commit on it, merge it back.
const TUTORIAL: &str = "\
# Git branching tutorial
branch feature
checkout feature
commit Add feature file
commit Polish feature
merge
";

#[derive(Parser)]
#[command(name = "branchlab")]
#[command(about = "A commit-graph simulator for learning branches, merges and rebases", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script of graph commands and print the resulting graph
    Run {
        /// Script file, one command per line
        script: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run the built-in branching tutorial
    Tutorial {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Run a script and report graph statistics and invariant status
    Check {
        /// Script file, one command per line
        script: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = match &cli.config {
        Some(path) => GraphConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GraphConfig::default(),
    };

    match cli.command {
        Commands::Run { script, format } => {
            let mut session = Session::new(&config);
            let outcomes = run_file(&mut session, &script)?;
            print_result(&session, &outcomes, format)?;
        }
        Commands::Tutorial { format } => {
            let mut session = Session::new(&config);
            let outcomes = session.run_script(TUTORIAL)?;
            print_result(&session, &outcomes, format)?;
        }
        Commands::Check { script } => {
            let mut session = Session::new(&config);
            run_file(&mut session, &script)?;
            print!("{}", render_check(&session));
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(session: &mut Session, path: &Path) -> Result<Vec<Outcome>> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let outcomes = session
        .run_script(&script)
        .with_context(|| format!("Script {} failed", path.display()))?;
    info!(path = %path.display(), commands = outcomes.len(), "script finished");
    Ok(outcomes)
}

fn print_result(session: &Session, outcomes: &[Outcome], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let json = session.graph().snapshot().to_json_pretty()?;
            println!("{}", json);
        }
        Format::Text => {
            for outcome in outcomes {
                println!("{}", outcome);
            }
            println!();
            print!("{}", render_text(session));
        }
    }
    Ok(())
}

/// Branches with their first-parent history, newest commit first.
fn render_text(session: &Session) -> String {
    let graph = session.graph();
    let mut out = String::new();

    for branch in graph.branches() {
        let marker = if branch.name == session.current() { "* " } else { "  " };
        let _ = writeln!(out, "{}{}", marker, branch.name);
        for id in branch.commit_ids.iter().rev() {
            let Some(commit) = graph.commit_by_id(id) else {
                continue;
            };
            let kind = if commit.is_merge() { "M" } else { "o" };
            let _ = writeln!(out, "    {} {} {}", kind, commit.short_id(), commit.message);
        }
    }
    out
}

fn render_check(session: &Session) -> String {
    let graph = session.graph();
    let stats = graph.stats();
    let mut out = String::new();

    let _ = writeln!(out, "Graph statistics:");
    let _ = writeln!(out, "  Total commits: {}", stats.total_commits);
    let _ = writeln!(out, "  Merge commits: {}", stats.merge_commits);
    let _ = writeln!(out, "  Root commits: {}", stats.root_commits);
    let _ = writeln!(out, "  Leaf commits: {}", stats.leaf_commits);
    let _ = writeln!(out, "  Live branches: {}", stats.live_branches);
    let _ = writeln!(out, "  Unreachable commits: {}", stats.unreachable_commits);
    match graph.check_invariants() {
        Ok(()) => {
            let _ = writeln!(out, "Invariants: ok");
        }
        Err(violation) => {
            let _ = writeln!(out, "Invariants: VIOLATED ({})", violation);
        }
    }
    out
}
