//! Centralized storage definitions for the shopping list.
//!
//! All durable state lives in one SQLite file holding a single key-value table.
//! Each key is one "durable slot"; the product list occupies exactly one of them.

pub const SHOPLIST_DB_NAME: &str = "shoplist.db";

pub const KV_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

/// Key of the slot holding the serialized product list.
pub const PRODUCTS_STORAGE_KEY: &str = "shoppingList";

/// Version written into every product envelope.
pub const PRODUCTS_SCHEMA_VERSION: u32 = 1;

pub const CONFIG_FILE_NAME: &str = "shoplist.toml";
