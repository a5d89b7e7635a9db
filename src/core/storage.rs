//! Durable key-value slots.
//!
//! A slot is a single string value under a fixed key, overwritten as a whole.
//! `SqliteStorage` is the on-disk backend; `MemoryStorage` backs tests and
//! ephemeral sessions and can be told to fail on demand.

use crate::core::db;
use crate::core::error::ShoplistError;
use crate::core::time::now_epoch_z;
use rusqlite::{Connection, OptionalExtension, params};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::rc::Rc;

pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ShoplistError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), ShoplistError>;
    fn remove_item(&self, key: &str) -> Result<(), ShoplistError>;
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(root: &Path, db_file: &str) -> Result<Self, ShoplistError> {
        let conn = db::initialize_kv_db(root, db_file)?;
        Ok(Self { conn })
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ShoplistError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ShoplistError> {
        self.conn.execute(
            "INSERT INTO kv(key, value, updated_at) VALUES(?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now_epoch_z()],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ShoplistError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory slots. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Current raw value of a slot, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn injected(op: &str) -> ShoplistError {
        ShoplistError::IoError(io::Error::other(format!("memory storage {op} disabled")))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ShoplistError> {
        if self.fail_reads.get() {
            return Err(Self::injected("read"));
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ShoplistError> {
        if self.fail_writes.get() {
            return Err(Self::injected("write"));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), ShoplistError> {
        if self.fail_writes.get() {
            return Err(Self::injected("write"));
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schemas;
    use tempfile::tempdir;

    #[test]
    fn test_sqlite_set_get_overwrite_remove() {
        let tmp = tempdir().unwrap();
        let storage = SqliteStorage::open(tmp.path(), schemas::SHOPLIST_DB_NAME).unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);

        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));

        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_sqlite_values_survive_reopen() {
        let tmp = tempdir().unwrap();
        {
            let storage = SqliteStorage::open(tmp.path(), schemas::SHOPLIST_DB_NAME).unwrap();
            storage.set_item("k", "kept").unwrap();
        }
        let storage = SqliteStorage::open(tmp.path(), schemas::SHOPLIST_DB_NAME).unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_memory_clones_share_state() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.set_item("k", "v").unwrap();
        assert_eq!(handle.peek("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_failure_injection() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v").unwrap();

        storage.set_fail_writes(true);
        assert!(storage.set_item("k", "w").is_err());
        assert!(storage.remove_item("k").is_err());
        assert_eq!(storage.peek("k").as_deref(), Some("v"));

        storage.set_fail_reads(true);
        assert!(storage.get_item("k").is_err());
    }
}
