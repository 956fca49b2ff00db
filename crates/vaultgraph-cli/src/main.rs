//! vaultgraph command-line tool.
//!
//! Drives a [`Session`](vaultgraph_storage::Session) against the SQLite
//! content store and ledger in one database file. Every mutating command
//! loads a snapshot, applies one change, stores the result and registers the
//! new hash, so the next invocation picks it up by default.
//!
//! Configuration comes from the environment, overridden by flags:
//! - `VAULTGRAPH_PASSPHRASE` / `--passphrase`
//! - `VAULTGRAPH_DB_PATH` / `--db` (default: "vaultgraph.db")
//! - `VAULTGRAPH_DATABASE` / `--database` (default: "default")
//!
//! Results are printed to stdout as JSON; logs go to stderr (`RUST_LOG`).

mod commands;

use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vaultgraph_core::NodeKind;
use vaultgraph_storage::StorageError;

/// Encrypted, content-addressed document graph.
#[derive(Parser)]
#[command(name = "vaultgraph", about = "Encrypted, content-addressed document graph")]
struct Cli {
    /// Passphrase the graph key is derived from.
    #[arg(long, env = "VAULTGRAPH_PASSPHRASE", hide_env_values = true, global = true)]
    passphrase: Option<String>,

    /// Path to the SQLite database holding blobs and the registry.
    #[arg(long, env = "VAULTGRAPH_DB_PATH", default_value = "vaultgraph.db", global = true)]
    db: String,

    /// Logical database name, recorded as the pin label.
    #[arg(long, env = "VAULTGRAPH_DATABASE", default_value = "default", global = true)]
    database: String,

    /// Snapshot to start from (default: the registered hash).
    #[arg(long, global = true)]
    from: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Command {
    /// Store and register an empty graph.
    Init,

    /// Insert a node, checking its parent.
    Add {
        #[arg(long)]
        id: String,
        /// One of: folder, file, note, link.
        #[arg(long)]
        kind: NodeKind,
        #[arg(long)]
        name: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Parse `--content` as JSON instead of plain text.
        #[arg(long)]
        json: bool,
        /// Encrypt the node's content with the session key.
        #[arg(long)]
        seal: bool,
    },

    /// Change fields of an existing node.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        kind: Option<NodeKind>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        json: bool,
    },

    /// Remove a node (orphaning its children unless `--cascade`).
    Remove {
        #[arg(long)]
        id: String,
        #[arg(long)]
        cascade: bool,
    },

    /// Make `child` a child of `parent`.
    Link {
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
    },

    /// Detach a node from its parent.
    Unlink {
        #[arg(long)]
        child: String,
    },

    /// Print one node, or all nodes.
    Show {
        #[arg(long)]
        id: Option<String>,
        /// Decrypt sealed content in the output.
        #[arg(long)]
        open: bool,
    },

    /// Print a node's resolved children.
    Children {
        #[arg(long)]
        id: String,
    },

    /// Print a node's resolved parent.
    Parent {
        #[arg(long)]
        id: String,
    },

    /// Print a node's ancestors, nearest first.
    Ancestors {
        #[arg(long)]
        id: String,
    },

    /// Print nodes matching every given filter.
    Query {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        kind: Option<NodeKind>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        parent: Option<String>,
        /// Comma-separated ids that must all be among the node's children.
        #[arg(long, value_delimiter = ',')]
        children: Vec<String>,
    },

    /// Check structural invariants.
    Check,

    /// Drop dangling references.
    Prune,

    /// Register a snapshot hash (default: the current one re-stored).
    Register,

    /// Print the registered hash.
    Registered,

    /// Print all pinned snapshots.
    Pins,

    /// Drop the backend's reference to a snapshot.
    Unpin {
        #[arg(long)]
        hash: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(db = %cli.db, database = %cli.database, "vaultgraph starting");

    let exit_code = match commands::run(cli).await {
        Ok(value) => {
            let json = serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize result: {}\"}}", e)
            });
            println!("{}", json);
            0
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            exit_code(&err)
        }
    };
    process::exit(exit_code);
}

/// Maps an error to the process exit code.
///
/// 1 = caller error, 2 = decode/authentication failure, 3 = backend or
/// ledger failure.
fn exit_code(err: &StorageError) -> i32 {
    match err {
        StorageError::MissingPassphrase
        | StorageError::Core(_)
        | StorageError::ContentState { .. }
        | StorageError::InvalidHash(_) => 1,
        StorageError::Decode { .. }
        | StorageError::Authentication
        | StorageError::Serialization(_) => 2,
        StorageError::Encode { .. }
        | StorageError::BlobNotFound(_)
        | StorageError::IntegrityError { .. }
        | StorageError::Sqlite(_)
        | StorageError::Migration(_)
        | StorageError::Backend { .. }
        | StorageError::Ledger { .. } => 3,
    }
}
