//! FlowSync CLI.
//!
//! Provides the `flowsync` binary for driving the synchronization engine
//! against a JSON workspace fixture: fetch node templates, extract nodes
//! from described source, synthesize edit sets, and search the catalog.
//!
//! Uses the same `flowsync_engine::SyncEngine` operations an embedding
//! server would, ensuring identical behavior from both entry points.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use flowsync_core::Node;
use flowsync_engine::{NodeKind, NodeRequest, SyncEngine};
use flowsync_workspace::InMemoryWorkspace;

/// FlowSync synchronization engine tools.
#[derive(Parser)]
#[command(name = "flowsync", about = "FlowSync synchronization engine tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build a node template for a kind at a position.
    Template {
        /// Path to the workspace fixture JSON.
        #[arg(short = 'w', long)]
        fixture: PathBuf,

        /// Node kind (e.g. call, connection, agentCall).
        #[arg(short, long)]
        kind: String,

        /// Target file within the workspace.
        #[arg(short, long)]
        file: PathBuf,

        /// Zero-based line.
        #[arg(short, long, default_value_t = 0)]
        line: u32,

        /// Zero-based column.
        #[arg(short, long, default_value_t = 0)]
        column: u32,

        /// Catalog entry parameterizing the template.
        #[arg(short, long)]
        entry: Option<String>,
    },

    /// Extract a populated node from the construct at a position.
    Extract {
        #[arg(short = 'w', long)]
        fixture: PathBuf,

        #[arg(short, long)]
        kind: String,

        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value_t = 0)]
        line: u32,

        #[arg(short, long, default_value_t = 0)]
        column: u32,

        /// Catalog entry typing the construct's parameters.
        #[arg(short, long)]
        entry: Option<String>,
    },

    /// Synthesize source edits from a node description.
    Edits {
        #[arg(short = 'w', long)]
        fixture: PathBuf,

        /// Path to the node JSON (as produced by `template` or `extract`).
        #[arg(short, long)]
        node: PathBuf,

        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value_t = 0)]
        line: u32,

        #[arg(short, long, default_value_t = 0)]
        column: u32,
    },

    /// Search the catalog.
    Search {
        /// Category to restrict the search to.
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Keyword query.
        query: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Template {
            fixture,
            kind,
            file,
            line,
            column,
            entry,
        } => run_template(&fixture, &kind, file, line, column, entry),
        Commands::Extract {
            fixture,
            kind,
            file,
            line,
            column,
            entry,
        } => run_extract(&fixture, &kind, file, line, column, entry),
        Commands::Edits {
            fixture,
            node,
            file,
            line,
            column,
        } => run_edits(&fixture, &node, file, line, column),
        Commands::Search { category, query } => run_search(category.as_deref(), &query),
    };
    process::exit(exit_code);
}

/// Execute the template subcommand.
///
/// Returns exit code: 0 = success, 1 = engine error, 2 = I/O or parse error.
fn run_template(
    fixture: &PathBuf,
    kind: &str,
    file: PathBuf,
    line: u32,
    column: u32,
    entry: Option<String>,
) -> i32 {
    let workspace = match load_fixture(fixture) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let kind = match parse_kind(kind) {
        Ok(k) => k,
        Err(code) => return code,
    };

    let mut request = NodeRequest::at(file, line, column);
    if let Some(entry) = entry {
        request = request.with_entry(entry);
    }

    let engine = SyncEngine::new(workspace);
    match engine.get_template(kind, &request) {
        Ok(node) => print_json(&node),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Execute the extract subcommand. Same exit-code map as `run_template`.
fn run_extract(
    fixture: &PathBuf,
    kind: &str,
    file: PathBuf,
    line: u32,
    column: u32,
    entry: Option<String>,
) -> i32 {
    let workspace = match load_fixture(fixture) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let kind = match parse_kind(kind) {
        Ok(k) => k,
        Err(code) => return code,
    };

    let mut request = NodeRequest::at(file, line, column);
    if let Some(entry) = entry {
        request = request.with_entry(entry);
    }

    let engine = SyncEngine::new(workspace);
    match engine.get_from_source(kind, &request) {
        Ok(node) => print_json(&node),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Execute the edits subcommand. Same exit-code map as `run_template`.
fn run_edits(fixture: &PathBuf, node_path: &PathBuf, file: PathBuf, line: u32, column: u32) -> i32 {
    let workspace = match load_fixture(fixture) {
        Ok(ws) => ws,
        Err(code) => return code,
    };
    let node: Node = match read_json(node_path) {
        Ok(n) => n,
        Err(code) => return code,
    };

    let request = NodeRequest::at(file, line, column);
    let engine = SyncEngine::new(workspace);
    match engine.to_source_edits(&node, &request) {
        Ok(edits) => print_json(&edits),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// Execute the search subcommand against the built-in catalog.
fn run_search(category: Option<&str>, query: &str) -> i32 {
    // Search needs no workspace answers; an empty one satisfies the engine.
    let engine = SyncEngine::new(InMemoryWorkspace::new("."));
    let hits = engine.search(category, query, None);
    print_json(&hits)
}

fn load_fixture(path: &PathBuf) -> Result<InMemoryWorkspace, i32> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, i32> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", path.display(), e);
            return Err(2);
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(e) => {
            eprintln!("Error: failed to parse '{}': {}", path.display(), e);
            Err(2)
        }
    }
}

fn parse_kind(kind: &str) -> Result<NodeKind, i32> {
    match kind.parse::<NodeKind>() {
        Ok(k) => Ok(k),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(1)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            1
        }
    }
}
