//! Subcommand execution.
//!
//! Each command opens the SQLite backends, resolves the starting snapshot,
//! and returns a JSON value for `main` to print.

use std::sync::Arc;

use serde_json::{json, Value};

use vaultgraph_core::{CoreError, Node, NodeKind, Predicate};
use vaultgraph_storage::codec;
use vaultgraph_storage::{
    ContentHash, ContentStore, Registry, Session, SessionConfig, SqliteContentStore,
    SqliteLedger, StorageError,
};

use crate::{Cli, Command};

/// Open backends plus the session built on them.
struct Context {
    session: Session,
    store: Arc<SqliteContentStore>,
    registry: Registry<SqliteLedger>,
    from: Option<String>,
}

impl Context {
    fn open(cli: &Cli) -> Result<Self, StorageError> {
        let store = Arc::new(SqliteContentStore::new(&cli.db)?);
        let ledger = Arc::new(SqliteLedger::new(&cli.db)?);
        let config = SessionConfig {
            passphrase: cli.passphrase.clone(),
            database: cli.database.clone(),
        };
        let backend: Arc<dyn ContentStore> = store.clone();
        let session = Session::open(config, backend)?;

        Ok(Context {
            session,
            store,
            registry: Registry::new(ledger),
            from: cli.from.clone(),
        })
    }

    /// The hash to start from: `--from`, else the registered hash.
    async fn base_hash(&self) -> Result<Option<ContentHash>, StorageError> {
        match &self.from {
            Some(raw) => Ok(Some(raw.parse()?)),
            None => self.registry.read_registered_hash().await,
        }
    }

    /// Loads the base snapshot, if there is one. An empty graph otherwise.
    async fn load_base(&mut self) -> Result<(), StorageError> {
        if let Some(hash) = self.base_hash().await? {
            self.session.load(&hash).await?;
        }
        Ok(())
    }

    /// Loads the base snapshot; reading commands need one to exist.
    async fn load_required(&mut self) -> Result<(), StorageError> {
        let hash = self.base_hash().await?.ok_or_else(|| StorageError::Backend {
            reason: "no snapshot registered; run `vaultgraph init` or pass --from".into(),
        })?;
        self.session.load(&hash).await
    }

    /// Stores the graph, registers the new hash, and reports both.
    async fn commit(&mut self, extra: Value) -> Result<Value, StorageError> {
        let receipt = self.registry.register_current_hash(&mut self.session).await?;
        let mut out = json!({
            "hash": receipt.hash.as_str(),
            "sequence": receipt.sequence,
            "nodes": self.session.graph().len(),
        });
        if let (Value::Object(out), Value::Object(extra)) = (&mut out, extra) {
            out.extend(extra);
        }
        Ok(out)
    }
}

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> Result<Value, StorageError> {
    let mut ctx = Context::open(&cli)?;

    match cli.command {
        Command::Init => ctx.commit(json!({})).await,

        Command::Add {
            id,
            kind,
            name,
            parent,
            content,
            json,
            seal,
        } => {
            ctx.load_base().await?;
            let mut node = Node::new(id.as_str(), kind, name);
            if let Some(parent) = parent {
                node = node.with_parent(parent);
            }
            if let Some(raw) = content {
                node.content = parse_content(raw, json)?;
            }
            if seal {
                codec::seal_content(&mut node, ctx.session.key())?;
            }
            ctx.session.graph_mut().insert_checked(node)?;
            ctx.commit(json!({ "added": id })).await
        }

        Command::Update {
            id,
            kind,
            name,
            content,
            json,
        } => {
            ctx.load_base().await?;
            let mut node = ctx
                .session
                .graph()
                .get_node(&id)
                .cloned()
                .ok_or_else(|| CoreError::NodeNotFound { id: id.as_str().into() })?;
            if let Some(kind) = kind {
                node.kind = kind;
            }
            if let Some(name) = name {
                node.name = name;
            }
            if let Some(raw) = content {
                if node.encrypted {
                    return Err(StorageError::ContentState {
                        node: id,
                        reason: "cannot overwrite sealed content".into(),
                    });
                }
                node.content = parse_content(raw, json)?;
            }
            ctx.session.graph_mut().update_node(node)?;
            ctx.commit(json!({ "updated": id })).await
        }

        Command::Remove { id, cascade } => {
            ctx.load_base().await?;
            let graph = ctx.session.graph_mut();
            let removed: Vec<String> = if cascade {
                graph
                    .remove_subtree(&id)
                    .into_iter()
                    .map(|n| n.id.to_string())
                    .collect()
            } else {
                graph.remove_node(&id).map(|n| n.id.to_string()).into_iter().collect()
            };
            if removed.is_empty() {
                return Err(CoreError::NodeNotFound { id: id.into() }.into());
            }
            ctx.commit(json!({ "removed": removed })).await
        }

        Command::Link { parent, child } => {
            ctx.load_base().await?;
            ctx.session.graph_mut().link(&parent, &child)?;
            ctx.commit(json!({ "linked": { "parent": parent, "child": child } }))
                .await
        }

        Command::Unlink { child } => {
            ctx.load_base().await?;
            ctx.session.graph_mut().unlink(&child)?;
            ctx.commit(json!({ "unlinked": child })).await
        }

        Command::Show { id, open } => {
            ctx.load_required().await?;
            let key = ctx.session.key().clone();
            let graph = ctx.session.graph();
            let nodes: Vec<Node> = match id {
                Some(id) => vec![graph
                    .get_node(&id)
                    .cloned()
                    .ok_or(CoreError::NodeNotFound { id: id.into() })?],
                None => graph.all_nodes().cloned().collect(),
            };

            let mut out = Vec::with_capacity(nodes.len());
            for mut node in nodes {
                if open && node.encrypted {
                    codec::open_content(&mut node, &key)?;
                }
                out.push(node);
            }
            Ok(serde_json::to_value(out)?)
        }

        Command::Children { id } => {
            ctx.load_required().await?;
            nodes_json(ctx.session.graph().children(&id))
        }

        Command::Parent { id } => {
            ctx.load_required().await?;
            Ok(serde_json::to_value(ctx.session.graph().parent(&id))?)
        }

        Command::Ancestors { id } => {
            ctx.load_required().await?;
            nodes_json(ctx.session.graph().ancestors(&id))
        }

        Command::Query {
            name,
            kind,
            content,
            parent,
            children,
        } => {
            ctx.load_required().await?;
            let predicate = build_predicate(name, kind, content, parent, children);
            tracing::debug!(?predicate, "running query");
            nodes_json(ctx.session.graph().query(&predicate))
        }

        Command::Check => {
            ctx.load_required().await?;
            match ctx.session.graph().validate() {
                Ok(()) => Ok(json!({ "valid": true, "nodes": ctx.session.graph().len() })),
                Err(err) => Ok(json!({ "valid": false, "error": err.to_string() })),
            }
        }

        Command::Prune => {
            ctx.load_required().await?;
            let pruned = ctx.session.graph_mut().prune_dangling();
            ctx.commit(json!({ "pruned": pruned })).await
        }

        Command::Register => {
            ctx.load_required().await?;
            ctx.commit(json!({})).await
        }

        Command::Registered => {
            let hash = ctx.registry.read_registered_hash().await?;
            Ok(json!({ "hash": hash.as_ref().map(ContentHash::as_str) }))
        }

        Command::Pins => {
            let pins: Vec<Value> = ctx
                .store
                .list()?
                .into_iter()
                .map(|(hash, label)| json!({ "hash": hash.as_str(), "label": label }))
                .collect();
            Ok(Value::Array(pins))
        }

        Command::Unpin { hash } => {
            let hash: ContentHash = hash.parse()?;
            ctx.session.unpin(&hash).await?;
            Ok(json!({ "unpinned": hash.as_str() }))
        }
    }
}

/// Plain text unless `as_json`, in which case the text must be valid JSON.
fn parse_content(raw: String, as_json: bool) -> Result<Value, StorageError> {
    if as_json {
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(Value::String(raw))
    }
}

/// Combines the given filters with `All`. No filters matches everything.
fn build_predicate(
    name: Option<String>,
    kind: Option<NodeKind>,
    content: Option<String>,
    parent: Option<String>,
    children: Vec<String>,
) -> Predicate {
    let mut parts = Vec::new();
    if let Some(name) = name {
        parts.push(Predicate::ByName(name));
    }
    if let Some(kind) = kind {
        parts.push(Predicate::ByKind(kind));
    }
    if let Some(content) = content {
        parts.push(Predicate::ByContent(content));
    }
    if let Some(parent) = parent {
        parts.push(Predicate::ByParent(parent.into()));
    }
    if !children.is_empty() {
        parts.push(Predicate::ByChildrenSuperset(
            children.into_iter().map(Into::into).collect(),
        ));
    }

    if parts.len() == 1 {
        parts.remove(0)
    } else {
        Predicate::All(parts)
    }
}

fn nodes_json(nodes: Vec<&Node>) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(nodes)?)
}
