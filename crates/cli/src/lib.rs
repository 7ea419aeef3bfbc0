//! CLI tool for querying consistent hash rings.
//!
//! Loads a ring description from a JSON file and provides commands for:
//! - Resolving keys to nodes
//! - Inspecting ring state and key-space ownership
//! - Measuring how many keys move when a node joins

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::{CliConfig, RingFile};
