//! Subcommands and their results.

use std::fmt::Write as _;

use anyhow::{bail, Context};
use clap::Subcommand;
use corelib::{HashRing, Node, NodeId};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve keys to the nodes that own them.
    Lookup {
        #[arg(required = true)]
        keys: Vec<String>,
        /// Print a JSON array instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Show the node registered under an id.
    Node { id: u64 },
    /// Summarize membership and key-space ownership.
    Inspect,
    /// Add a node and report how many sampled keys change owner.
    Diff {
        /// Node to add, as `id,address,port,weight`.
        #[arg(long, value_parser = parse_node)]
        add: Node,
        /// Number of synthetic keys to sample.
        #[arg(long, default_value_t = 10_000)]
        keys: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
    pub key: String,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipRow {
    pub node: Node,
    pub slots: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Lookups { lookups: Vec<Lookup>, json: bool },
    Node(Node),
    Inspect { replicas: usize, weighted: bool, tokens: usize, nodes: Vec<OwnershipRow> },
    Diff { added: NodeId, sampled: usize, moved: usize },
}

impl Command {
    pub fn execute(self, ring: &HashRing) -> anyhow::Result<CommandResult> {
        match self {
            Command::Lookup { keys, json } => {
                let lookups = keys
                    .into_iter()
                    .map(|key| -> anyhow::Result<Lookup> {
                        let node = ring.get_node(&key).with_context(|| format!("failed to resolve {key:?}"))?;
                        Ok(Lookup { key, node })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(CommandResult::Lookups { lookups, json })
            }
            Command::Node { id } => match ring.get_node_by_id(NodeId(id)) {
                Some(node) => Ok(CommandResult::Node(node)),
                None => bail!("no node with id {id}"),
            },
            Command::Inspect => {
                let config = ring.config();
                let nodes = ring
                    .ownership()
                    .iter()
                    .map(|entry| OwnershipRow {
                        node: entry.node.clone(),
                        slots: entry.slots,
                        fraction: entry.fraction,
                    })
                    .collect();
                Ok(CommandResult::Inspect {
                    replicas: config.replicas,
                    weighted: config.weighted,
                    tokens: ring.token_count(),
                    nodes,
                })
            }
            Command::Diff { add, keys } => {
                let sample: Vec<String> = (0..keys).map(|i| format!("key-{i}")).collect();
                let before = owners(ring, &sample)?;

                let added = add.id;
                if !ring.add_node(add) {
                    bail!("node {added} is already registered");
                }
                let after = owners(ring, &sample)?;

                let moved = before.iter().zip(&after).filter(|(b, a)| b != a).count();
                debug!(node = %added, sampled = keys, moved, "measured key movement");
                Ok(CommandResult::Diff { added, sampled: keys, moved })
            }
        }
    }
}

fn owners(ring: &HashRing, keys: &[String]) -> anyhow::Result<Vec<NodeId>> {
    keys.iter()
        .map(|key| -> anyhow::Result<NodeId> { Ok(ring.get_node(key)?.id) })
        .collect()
}

/// Parse `id,address,port,weight`.
pub fn parse_node(raw: &str) -> Result<Node, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [id, address, port, weight] = parts.as_slice() else {
        return Err(format!("expected id,address,port,weight, got {raw:?}"));
    };
    let id = id.parse().map_err(|err| format!("invalid id {id:?}: {err}"))?;
    let port = port.parse().map_err(|err| format!("invalid port {port:?}: {err}"))?;
    let weight = weight.parse().map_err(|err| format!("invalid weight {weight:?}: {err}"))?;
    Ok(Node::new(id, *address, port, weight))
}

impl CommandResult {
    pub fn render(&self) -> anyhow::Result<String> {
        let mut out = String::new();
        match self {
            CommandResult::Lookups { lookups, json: true } => {
                out = serde_json::to_string_pretty(lookups)?;
                out.push('\n');
            }
            CommandResult::Lookups { lookups, json: false } => {
                for lookup in lookups {
                    writeln!(out, "{} -> {} ({})", lookup.key, lookup.node.id, lookup.node.endpoint())?;
                }
            }
            CommandResult::Node(node) => writeln!(out, "{node}")?,
            CommandResult::Inspect { replicas, weighted, tokens, nodes } => {
                writeln!(out, "replicas: {replicas} (weighted: {weighted})")?;
                writeln!(out, "nodes: {}  tokens: {tokens}", nodes.len())?;
                for row in nodes {
                    writeln!(
                        out,
                        "{:>6}  {:<21}  weight {:<3}  slots {:<5}  {:>6.2}%",
                        row.node.id,
                        row.node.endpoint(),
                        row.node.weight,
                        row.slots,
                        row.fraction * 100.0
                    )?;
                }
            }
            CommandResult::Diff { added, sampled, moved } => {
                let pct = if *sampled == 0 { 0.0 } else { *moved as f64 * 100.0 / *sampled as f64 };
                writeln!(out, "added node {added}: {moved}/{sampled} keys moved ({pct:.2}%)")?;
            }
        }
        Ok(out)
    }
}
