//! Where the durable slot lives.
//!
//! A `Store` names a backend for the key-value slots: an on-disk SQLite file
//! under a data directory, or a process-local map for throwaway sessions.

use crate::core::config::ShoplistConfig;
use crate::core::error::ShoplistError;
use crate::core::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use std::env;
use std::path::PathBuf;

/// Backend discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// SQLite file inside `root`.
    Disk,
    /// Nothing survives the process; `root` is only used for config lookup.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Store {
    pub kind: StoreKind,
    /// Absolute path to the data directory
    pub root: PathBuf,
}

impl Store {
    pub fn disk(root: PathBuf) -> Self {
        Self {
            kind: StoreKind::Disk,
            root,
        }
    }

    pub fn memory(root: PathBuf) -> Self {
        Self {
            kind: StoreKind::Memory,
            root,
        }
    }

    pub fn open_storage(
        &self,
        config: &ShoplistConfig,
    ) -> Result<Box<dyn KeyValueStorage>, ShoplistError> {
        match self.kind {
            StoreKind::Disk => Ok(Box::new(SqliteStorage::open(&self.root, &config.db_file)?)),
            StoreKind::Memory => Ok(Box::new(MemoryStorage::new())),
        }
    }
}

/// `~/.shoplist`, falling back to `./.shoplist` when no home directory is known.
pub fn default_data_dir() -> Result<PathBuf, ShoplistError> {
    match env::var_os("HOME") {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home).join(".shoplist")),
        _ => Ok(env::current_dir()?.join(".shoplist")),
    }
}
