//! CLI struct definitions for the shoplist command-line interface.
//!
//! All clap-derived types for the top level live here; list commands are
//! shared with the interactive shell and live in `plugins::session`.

use crate::plugins::session::{ListCommand, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "shoplist",
    version = env!("CARGO_PKG_VERSION"),
    about = "A local-first shopping list."
)]
pub(crate) struct Cli {
    /// Data directory holding shoplist.db and shoplist.toml (default: ~/.shoplist).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Explicit config file.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Keep everything in memory; nothing is read from or written to disk.
    #[clap(long, global = true)]
    pub ephemeral: bool,
    /// Output format.
    #[clap(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    #[clap(flatten)]
    List(ListCommand),
    /// Interactive session reading commands from stdin.
    Shell,
    /// Print the effective configuration.
    Config,
}
