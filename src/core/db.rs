use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::ShoplistError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::ShoplistError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::ShoplistError::RusqliteError)?;
    Ok(conn)
}

pub fn shoplist_db_path(root: &Path, db_file: &str) -> PathBuf {
    root.join(db_file)
}

/// Open (creating if needed) the key-value database under `root`.
pub fn initialize_kv_db(root: &Path, db_file: &str) -> Result<Connection, error::ShoplistError> {
    fs::create_dir_all(root).map_err(error::ShoplistError::IoError)?;
    let db_path = shoplist_db_path(root, db_file);
    let conn = db_connect(&db_path.to_string_lossy())?;
    conn.execute(schemas::KV_DB_SCHEMA, [])?;
    Ok(conn)
}
