//! Command-line arguments and the ring description file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use corelib::{HashRing, Node, RingBuilder, RingConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Level};

use crate::commands::Command;

#[derive(Debug, Parser)]
#[command(name = "hashring", version, about = "Query a consistent hash ring")]
pub struct CliConfig {
    /// Ring description (JSON).
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose)?;

        let ring = RingFile::load(&self.config)?.build();
        let result = self.command.execute(&ring)?;
        print!("{}", result.render()?);
        Ok(())
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

/// Ring description loaded from disk.
///
/// ```json
/// { "replicas": 100, "weighted": false,
///   "nodes": [ { "id": 1, "address": "10.0.0.1", "port": 6379, "weight": 1 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RingFile {
    #[serde(flatten)]
    pub ring: RingConfig,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl RingFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ring file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid ring file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build the ring; later entries reusing an id are dropped with a warning.
    pub fn build(self) -> HashRing {
        let mut seen = HashSet::new();
        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .filter(|node| {
                let fresh = seen.insert(node.id);
                if !fresh {
                    warn!(node = %node.id, "duplicate node id in ring file, keeping the first entry");
                }
                fresh
            })
            .collect();

        info!(nodes = nodes.len(), replicas = self.ring.replicas, weighted = self.ring.weighted, "building ring");
        RingBuilder::new().with_config(self.ring).add_nodes(nodes).build()
    }
}
