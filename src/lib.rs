//! shoplist: a local-first shopping list.
//!
//! Products (name, price, store) are added to the top of a single list,
//! ticked off as purchased, filtered by name, sorted alphabetically and
//! removed. The whole list is persisted in one durable key-value slot after
//! every change and restored once at startup.
//!
//! # Architecture
//!
//! - [`plugins::products::ProductListStore`] owns the ordered collection and
//!   is the only thing that mutates it.
//! - [`plugins::persistence::PersistenceGateway`] encodes the collection as a
//!   versioned JSON envelope and writes it to a [`core::storage::KeyValueStorage`]
//!   (SQLite on disk, or memory). Persistence is best effort: failures are
//!   logged and the in-memory list stays authoritative.
//! - Entry and removal transitions are presentation state with deadlines,
//!   owned by the store and advanced explicitly.
//!
//! # Examples
//!
//! ```bash
//! shoplist add Milk 4,99 Lidl
//! shoplist list --filter mil
//! shoplist sort
//! shoplist toggle <ID>
//! shoplist remove <ID>
//! shoplist shell
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: storage, configuration, errors, logging and rendering
//! - [`plugins`]: products, the list store, persistence and command surfaces

mod cli;
pub mod core;
pub mod plugins;

use cli::{Cli, Command};
use crate::core::{
    config, error, logging,
    store::{self, Store},
};
use crate::plugins::session::{OutputFormat, Session};
use crate::plugins::shell;

use clap::Parser;
use std::io;
use std::process::ExitCode;
use std::time::Instant;
use tracing::debug;

pub fn run() -> Result<ExitCode, error::ShoplistError> {
    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(d) => d,
        None => store::default_data_dir()?,
    };
    let config = config::load_config(&data_dir, cli.config.as_deref())?;
    logging::init_logging(&config.log_level);

    let store = if cli.ephemeral {
        Store::memory(data_dir)
    } else {
        Store::disk(data_dir)
    };
    debug!(root = %store.root.display(), kind = ?store.kind, "opening store");

    match cli.command {
        Command::Config => {
            let rendered = match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&config)?,
                OutputFormat::Text => toml::to_string(&config)?,
            };
            println!("{}", rendered.trim_end());
            Ok(ExitCode::SUCCESS)
        }
        Command::Shell => {
            let mut session = Session::open(&store, &config);
            let stdin = io::stdin();
            shell::run_shell(&mut session, stdin.lock(), io::stdout(), cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::List(cmd) => {
            let mut session = Session::open(&store, &config);
            let out = session.execute(&cmd, Instant::now());
            // A one-shot process has no later moment to finish a removal in.
            session.close();
            println!("{}", session.render(&out, cli.format));
            let code = match out.get("status").and_then(|x| x.as_str()) {
                Some("invalid") => ExitCode::from(2),
                Some("error") => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            };
            Ok(code)
        }
    }
}
